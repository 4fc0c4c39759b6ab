// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tempfile::TempDir;

fn iface(root: &Path, name: &str, state: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("operstate"), format!("{state}\n")).unwrap();
    dir
}

fn sensor(root: &Path) -> LinkSensor {
    LinkSensor::new(root, Duration::from_millis(100))
}

#[test]
fn test_missing_table_assumes_online() {
    let temp = TempDir::new().unwrap();
    let reading = sensor(&temp.path().join("absent")).read();

    assert_eq!(reading, LinkReading { online: true, link: None });
}

#[test]
fn test_loopback_only_is_offline() {
    let temp = TempDir::new().unwrap();
    iface(temp.path(), "lo", "unknown");

    assert_eq!(sensor(temp.path()).read(), LinkReading { online: false, link: None });
}

#[test]
fn test_down_interfaces_are_offline() {
    let temp = TempDir::new().unwrap();
    iface(temp.path(), "eth0", "down");
    iface(temp.path(), "wlan0", "dormant");

    assert!(!sensor(temp.path()).read().online);
}

#[test]
fn test_lost_carrier_is_offline() {
    let temp = TempDir::new().unwrap();
    let eth = iface(temp.path(), "eth0", "up");
    fs::write(eth.join("carrier"), "0\n").unwrap();

    assert_eq!(sensor(temp.path()).read(), LinkReading { online: false, link: None });
}

#[test]
fn test_carrier_present_is_online() {
    let temp = TempDir::new().unwrap();
    let eth = iface(temp.path(), "eth0", "up");
    fs::write(eth.join("carrier"), "1\n").unwrap();

    assert!(sensor(temp.path()).read().online);
}

#[test]
fn test_ethernet_with_speed() {
    let temp = TempDir::new().unwrap();
    let eth = iface(temp.path(), "eth0", "up");
    fs::write(eth.join("speed"), "1000\n").unwrap();

    let reading = sensor(temp.path()).read();

    assert!(reading.online);
    let link = reading.link.unwrap();
    assert_eq!(link.link_type.as_deref(), Some("ethernet"));
    assert_eq!(link.downlink_mbps, Some(1000.0));
}

#[test]
fn test_wireless_detection() {
    let temp = TempDir::new().unwrap();
    let radio = iface(temp.path(), "radio0", "up");
    fs::create_dir_all(radio.join("wireless")).unwrap();

    let link = sensor(temp.path()).read().link.unwrap();

    assert_eq!(link.link_type.as_deref(), Some("wifi"));
    assert_eq!(link.downlink_mbps, None);
}

#[test]
fn test_first_up_interface_by_name_wins() {
    let temp = TempDir::new().unwrap();
    iface(temp.path(), "wlp3s0", "up");
    let eth = iface(temp.path(), "enp0s1", "up");
    fs::write(eth.join("speed"), "-1").unwrap();

    let link = sensor(temp.path()).read().link.unwrap();

    assert_eq!(link.link_type.as_deref(), Some("ethernet"));
    assert_eq!(link.downlink_mbps, None);
}

#[tokio::test(start_paused = true)]
async fn test_run_feeds_monitor_until_cancelled() {
    let temp = TempDir::new().unwrap();
    let eth = iface(temp.path(), "eth0", "up");
    let monitor = ConnectivityMonitor::new(false, None);
    let cancel = CancellationToken::new();

    let task = tokio::spawn(sensor(temp.path()).run(monitor.clone(), cancel.clone()));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(monitor.is_online());

    fs::write(eth.join("operstate"), "down").unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!monitor.is_online());
    assert_eq!(monitor.link(), None);

    cancel.cancel();
    task.await.unwrap();
}
