// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn link(
    effective_type: Option<EffectiveType>,
    rtt_ms: Option<u32>,
    downlink_mbps: Option<f64>,
) -> LinkMetadata {
    LinkMetadata { link_type: None, effective_type, downlink_mbps, rtt_ms }
}

#[parameterized(
    fast_4g = { Some(EffectiveType::FourG), Some(40), None, ConnectionQuality::Excellent },
    ok_4g = { Some(EffectiveType::FourG), Some(80), None, ConnectionQuality::Good },
    slow_4g = { Some(EffectiveType::FourG), Some(150), None, ConnectionQuality::Fair },
    unknown_rtt_4g = { Some(EffectiveType::FourG), None, Some(50.0), ConnectionQuality::Fair },
    three_g = { Some(EffectiveType::ThreeG), Some(10), None, ConnectionQuality::Fair },
    two_g = { Some(EffectiveType::TwoG), None, Some(100.0), ConnectionQuality::Poor },
    slow_two_g = { Some(EffectiveType::Slow2g), Some(10), Some(50.0), ConnectionQuality::Poor },
    rtt_excellent = { None, Some(49), None, ConnectionQuality::Excellent },
    rtt_good = { None, Some(50), None, ConnectionQuality::Good },
    rtt_fair = { None, Some(299), None, ConnectionQuality::Fair },
    rtt_poor = { None, Some(300), None, ConnectionQuality::Poor },
    rtt_beats_downlink = { None, Some(400), Some(100.0), ConnectionQuality::Poor },
    downlink_excellent = { None, None, Some(10.0), ConnectionQuality::Excellent },
    downlink_good = { None, None, Some(5.0), ConnectionQuality::Good },
    downlink_fair = { None, None, Some(1.0), ConnectionQuality::Fair },
    downlink_poor = { None, None, Some(0.5), ConnectionQuality::Poor },
    nothing_known = { None, None, None, ConnectionQuality::Good },
)]
fn classify_rules(
    effective_type: Option<EffectiveType>,
    rtt: Option<u32>,
    downlink: Option<f64>,
    expected: ConnectionQuality,
) {
    let meta = link(effective_type, rtt, downlink);
    assert_eq!(classify(true, Some(&meta), None), expected);
}

#[test]
fn offline_wins_over_everything() {
    let meta = link(Some(EffectiveType::FourG), Some(10), Some(100.0));
    assert_eq!(classify(false, Some(&meta), Some(5)), ConnectionQuality::Offline);
}

#[test]
fn missing_metadata_is_optimistic() {
    assert_eq!(classify(true, None, None), ConnectionQuality::Good);
}

#[test]
fn probe_latency_fills_in_for_missing_rtt() {
    assert_eq!(classify(true, None, Some(20)), ConnectionQuality::Excellent);
    assert_eq!(classify(true, None, Some(350)), ConnectionQuality::Poor);

    let meta = link(None, Some(250), None);
    assert_eq!(classify(true, Some(&meta), Some(20)), ConnectionQuality::Fair);
}

#[test]
fn classification_is_monotonic_in_rtt() {
    let types = [
        None,
        Some(EffectiveType::FourG),
        Some(EffectiveType::ThreeG),
        Some(EffectiveType::TwoG),
        Some(EffectiveType::Slow2g),
    ];
    let downlinks = [None, Some(0.2), Some(3.0), Some(20.0)];

    for effective_type in types {
        for downlink in downlinks {
            let mut previous = ConnectionQuality::Excellent;
            for rtt in (0..1_000).step_by(5) {
                let meta = link(effective_type, Some(rtt), downlink);
                let quality = classify(true, Some(&meta), None);
                assert!(
                    quality <= previous,
                    "rtt {rtt} with {effective_type:?}/{downlink:?} raised quality to {quality}"
                );
                previous = quality;
            }
        }
    }
}
