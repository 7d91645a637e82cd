//! End-to-end watcher flow over mock lines.
//!
//! Each test stands up a full presence pipeline (registry, cooldown,
//! policy, transmitter on a mock line pair), feeds advertisements through
//! the handle, and asserts both the emitted events and the pulses that did
//! (or did not) reach the wire.

use std::time::Duration;

use gatelink_core::{Credential, MacAddress, WiegandFormat};
use gatelink_hardware::mock::{LineProbe, MockDelay, MockLinePair, MockPin};
use gatelink_presence::{
    AccessDecision, Advertisement, CooldownTracker, CredentialPolicy, DeviceRegistry,
    PresenceWatcher, WatcherHandle,
};
use gatelink_wiegand::WiegandTransmitter;

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

fn authorized_mac() -> MacAddress {
    MacAddress::parse("A4:C1:38:AB:CD:EF").unwrap()
}

fn stranger_mac() -> MacAddress {
    MacAddress::parse("DE:AD:BE:EF:00:01").unwrap()
}

fn spawn_watcher(
    policy: CredentialPolicy,
    cooldown: CooldownTracker,
) -> (WatcherHandle, LineProbe) {
    let mut registry = DeviceRegistry::new();
    registry.add(authorized_mac(), Some("test fob".to_string()));

    let (d0, d1, delay, probe) = MockLinePair::new();
    let transmitter: WiegandTransmitter<MockPin, MockDelay> =
        WiegandTransmitter::new(d0, d1, delay);
    probe.clear(); // drop construction writes; tests count pulses only

    let (watcher, handle) = PresenceWatcher::new(registry, cooldown, policy, transmitter);
    tokio::spawn(watcher.run());

    (handle, probe)
}

async fn next_event(handle: &mut WatcherHandle) -> gatelink_presence::AccessEvent {
    tokio::time::timeout(EVENT_TIMEOUT, handle.next_event())
        .await
        .expect("timed out waiting for access event")
        .expect("watcher stopped unexpectedly")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn authorized_device_triggers_transmission() {
    let (mut handle, probe) = spawn_watcher(
        CredentialPolicy {
            format: WiegandFormat::W26,
            facility_code: 123,
        },
        CooldownTracker::new(Duration::from_secs(5)),
    );

    handle
        .advertise(Advertisement::new(authorized_mac()).with_rssi(-55))
        .await
        .unwrap();

    let event = next_event(&mut handle).await;
    assert_eq!(event.decision, AccessDecision::Granted);
    assert_eq!(event.mac, authorized_mac());
    assert_eq!(
        event.credential,
        Some(Credential::Wiegand26 {
            facility: 123,
            card: 52719
        })
    );

    assert_eq!(probe.pulse_count(), 26);
    assert!(probe.lines_idle());

    handle.shutdown();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unknown_device_is_ignored_silently_on_the_wire() {
    let (mut handle, probe) = spawn_watcher(
        CredentialPolicy::default(),
        CooldownTracker::new(Duration::from_secs(5)),
    );

    handle
        .advertise(Advertisement::new(stranger_mac()))
        .await
        .unwrap();

    let event = next_event(&mut handle).await;
    assert_eq!(event.decision, AccessDecision::UnknownDevice);
    assert_eq!(event.credential, None);
    assert_eq!(probe.pulse_count(), 0);

    handle.shutdown();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cooldown_blocks_rapid_retrigger() {
    let (mut handle, probe) = spawn_watcher(
        CredentialPolicy::default(),
        CooldownTracker::new(Duration::from_secs(30)),
    );

    handle
        .advertise(Advertisement::new(authorized_mac()))
        .await
        .unwrap();
    handle
        .advertise(Advertisement::new(authorized_mac()))
        .await
        .unwrap();

    let first = next_event(&mut handle).await;
    let second = next_event(&mut handle).await;

    assert_eq!(first.decision, AccessDecision::Granted);
    assert_eq!(second.decision, AccessDecision::CoolingDown);
    assert_eq!(second.credential, None);

    // Exactly one transmission reached the lines.
    assert_eq!(probe.pulse_count(), 26);

    handle.shutdown();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn advertisements_are_handled_in_order() {
    let (mut handle, probe) = spawn_watcher(
        CredentialPolicy {
            format: WiegandFormat::Em4100,
            facility_code: 0,
        },
        CooldownTracker::new(Duration::from_secs(5)),
    );

    handle
        .advertise(Advertisement::new(stranger_mac()))
        .await
        .unwrap();
    handle
        .advertise(Advertisement::new(authorized_mac()))
        .await
        .unwrap();

    assert_eq!(
        next_event(&mut handle).await.decision,
        AccessDecision::UnknownDevice
    );
    let granted = next_event(&mut handle).await;
    assert_eq!(granted.decision, AccessDecision::Granted);
    assert_eq!(
        granted.credential,
        Some(Credential::Em4100 {
            version: 0xA4,
            card_id: 0xC138_ABCD
        })
    );

    assert_eq!(probe.pulse_count(), 40);

    handle.shutdown();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shutdown_stops_the_event_stream() {
    let (mut handle, _probe) = spawn_watcher(
        CredentialPolicy::default(),
        CooldownTracker::new(Duration::from_secs(5)),
    );

    handle.shutdown();

    let closed = tokio::time::timeout(EVENT_TIMEOUT, handle.next_event())
        .await
        .expect("timed out waiting for watcher shutdown");
    assert!(closed.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn advertise_after_shutdown_reports_closed_channel() {
    let (handle, _probe) = spawn_watcher(
        CredentialPolicy::default(),
        CooldownTracker::new(Duration::from_secs(5)),
    );

    handle.shutdown();
    // Give the watcher a moment to observe cancellation and drop the
    // receiver.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let result = handle.advertise(Advertisement::new(authorized_mac())).await;
    assert!(result.is_err());
}
