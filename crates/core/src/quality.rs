// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection quality classification.
//!
//! Rules are evaluated in order and the first one that applies wins:
//!
//! 1. Platform reports offline: `offline`.
//! 2. Effective type known: `4g` is graded by rtt (`<50` excellent, `<100`
//!    good, otherwise fair), `3g` is fair, `2g`/`slow-2g` are poor.
//! 3. Round-trip time known: `<50` excellent, `<100` good, `<300` fair,
//!    otherwise poor.
//! 4. Downlink known: `>=10` excellent, `>=5` good, `>=1` fair, otherwise poor.
//! 5. Nothing known: `good`.

use crate::status::{ConnectionQuality, EffectiveType, LinkMetadata};

/// Maps link metadata and probe latency onto a quality tier.
///
/// `probe_latency_ms` stands in for the link's round-trip time when the
/// platform does not report one.
pub fn classify(
    raw_online: bool,
    link: Option<&LinkMetadata>,
    probe_latency_ms: Option<u32>,
) -> ConnectionQuality {
    if !raw_online {
        return ConnectionQuality::Offline;
    }

    let rtt = link.and_then(|l| l.rtt_ms).or(probe_latency_ms);
    let effective_type = link.and_then(|l| l.effective_type);
    let downlink = link.and_then(|l| l.downlink_mbps);

    if let Some(effective_type) = effective_type {
        return match effective_type {
            EffectiveType::FourG => match rtt {
                Some(rtt) if rtt < 50 => ConnectionQuality::Excellent,
                Some(rtt) if rtt < 100 => ConnectionQuality::Good,
                _ => ConnectionQuality::Fair,
            },
            EffectiveType::ThreeG => ConnectionQuality::Fair,
            EffectiveType::TwoG | EffectiveType::Slow2g => ConnectionQuality::Poor,
        };
    }

    if let Some(rtt) = rtt {
        return match rtt {
            0..=49 => ConnectionQuality::Excellent,
            50..=99 => ConnectionQuality::Good,
            100..=299 => ConnectionQuality::Fair,
            _ => ConnectionQuality::Poor,
        };
    }

    if let Some(downlink) = downlink {
        return if downlink >= 10.0 {
            ConnectionQuality::Excellent
        } else if downlink >= 5.0 {
            ConnectionQuality::Good
        } else if downlink >= 1.0 {
            ConnectionQuality::Fair
        } else {
            ConnectionQuality::Poor
        };
    }

    ConnectionQuality::Good
}

#[cfg(test)]
#[path = "quality_tests.rs"]
mod tests;
