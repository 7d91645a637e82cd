//! The presence watcher: advertisements in, pulses and events out.

use crate::advertisement::Advertisement;
use crate::cooldown::CooldownTracker;
use crate::derive::{CredentialPolicy, derive_credential};
use crate::registry::DeviceRegistry;
use chrono::{DateTime, Utc};
use gatelink_core::{Credential, Error, MacAddress, Result};
use gatelink_hardware::{DelayUs, OutputPin};
use gatelink_wiegand::WiegandTransmitter;
use serde::Serialize;
use std::fmt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Depth of the advertisement and event channels.
///
/// Deep enough to absorb a scan burst while a 40 ms transmission is in
/// flight; advertisements are never dropped, senders await instead.
const CHANNEL_DEPTH: usize = 64;

/// Outcome of handling one advertisement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    /// Device authorized; credential transmitted.
    Granted,

    /// Device not on the allowlist; nothing transmitted.
    UnknownDevice,

    /// Device inside its cooldown window; nothing transmitted.
    CoolingDown,
}

impl fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessDecision::Granted => write!(f, "granted"),
            AccessDecision::UnknownDevice => write!(f, "unknown device"),
            AccessDecision::CoolingDown => write!(f, "cooling down"),
        }
    }
}

/// Record of one handled advertisement.
#[derive(Debug, Clone, Serialize)]
pub struct AccessEvent {
    /// Unique event id.
    pub id: Uuid,

    /// The advertising device.
    pub mac: MacAddress,

    /// What the watcher decided.
    pub decision: AccessDecision,

    /// The credential transmitted, present only for granted events.
    pub credential: Option<Credential>,

    /// When the decision was made.
    pub at: DateTime<Utc>,
}

impl AccessEvent {
    fn new(mac: MacAddress, decision: AccessDecision, credential: Option<Credential>) -> Self {
        AccessEvent {
            id: Uuid::new_v4(),
            mac,
            decision,
            credential,
            at: Utc::now(),
        }
    }
}

/// Control handle over a running [`PresenceWatcher`].
///
/// The scanner side feeds advertisements through
/// [`advertise`](WatcherHandle::advertise); observers drain decisions from
/// [`next_event`](WatcherHandle::next_event);
/// [`shutdown`](WatcherHandle::shutdown) stops the watcher after the
/// in-flight advertisement completes.
#[derive(Debug)]
pub struct WatcherHandle {
    adv_tx: mpsc::Sender<Advertisement>,
    events_rx: mpsc::Receiver<AccessEvent>,
    cancel: CancellationToken,
}

impl WatcherHandle {
    /// Feed an observed advertisement to the watcher.
    ///
    /// Awaits if the watcher is mid-transmission and the queue is full;
    /// advertisements are processed strictly in arrival order.
    ///
    /// # Errors
    /// Returns `Error::ChannelClosed` if the watcher has shut down.
    pub async fn advertise(&self, adv: Advertisement) -> Result<()> {
        self.adv_tx
            .send(adv)
            .await
            .map_err(|_| Error::ChannelClosed("presence watcher".to_string()))
    }

    /// Receive the next access event, or `None` once the watcher stops.
    pub async fn next_event(&mut self) -> Option<AccessEvent> {
        self.events_rx.recv().await
    }

    /// Request shutdown. Idempotent.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// The serialization point between BLE presence and the Wiegand lines.
///
/// Owns the transmitter exclusively and handles advertisements one at a
/// time, so no two transmissions can ever interleave. This is the
/// mutual-exclusion boundary the transmitter's blocking contract requires
/// of its caller. The blocking send runs inside
/// [`tokio::task::block_in_place`], so the watcher must live on a
/// multi-thread runtime.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use gatelink_core::MacAddress;
/// use gatelink_hardware::mock::MockLinePair;
/// use gatelink_presence::{
///     Advertisement, CooldownTracker, CredentialPolicy, DeviceRegistry, PresenceWatcher,
/// };
/// use gatelink_wiegand::WiegandTransmitter;
///
/// # async fn example() -> gatelink_core::Result<()> {
/// let mac = MacAddress::parse("A4:C1:38:AB:CD:EF")?;
/// let mut registry = DeviceRegistry::new();
/// registry.add(mac, Some("demo fob".to_string()));
///
/// let (d0, d1, delay, _probe) = MockLinePair::new();
/// let transmitter = WiegandTransmitter::new(d0, d1, delay);
///
/// let (watcher, mut handle) = PresenceWatcher::new(
///     registry,
///     CooldownTracker::new(Duration::from_secs(5)),
///     CredentialPolicy::default(),
///     transmitter,
/// );
/// tokio::spawn(watcher.run());
///
/// handle.advertise(Advertisement::new(mac)).await?;
/// let event = handle.next_event().await.unwrap();
/// println!("{}: {}", event.mac, event.decision);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PresenceWatcher<P: OutputPin, D: DelayUs> {
    registry: DeviceRegistry,
    cooldown: CooldownTracker,
    policy: CredentialPolicy,
    transmitter: WiegandTransmitter<P, D>,
    adv_rx: mpsc::Receiver<Advertisement>,
    events_tx: mpsc::Sender<AccessEvent>,
    cancel: CancellationToken,
}

impl<P, D> PresenceWatcher<P, D>
where
    P: OutputPin + Send,
    D: DelayUs + Send,
{
    /// Create a watcher and its control handle.
    pub fn new(
        registry: DeviceRegistry,
        cooldown: CooldownTracker,
        policy: CredentialPolicy,
        transmitter: WiegandTransmitter<P, D>,
    ) -> (Self, WatcherHandle) {
        let (adv_tx, adv_rx) = mpsc::channel(CHANNEL_DEPTH);
        let (events_tx, events_rx) = mpsc::channel(CHANNEL_DEPTH);
        let cancel = CancellationToken::new();

        let watcher = PresenceWatcher {
            registry,
            cooldown,
            policy,
            transmitter,
            adv_rx,
            events_tx,
            cancel: cancel.clone(),
        };
        let handle = WatcherHandle {
            adv_tx,
            events_rx,
            cancel,
        };

        (watcher, handle)
    }

    /// Run until shutdown or until every advertisement sender is dropped.
    pub async fn run(mut self) {
        info!(
            devices = self.registry.len(),
            format = %self.policy.format,
            "presence watcher started"
        );

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("presence watcher shutting down");
                    break;
                }
                maybe_adv = self.adv_rx.recv() => {
                    match maybe_adv {
                        Some(adv) => self.handle_advertisement(adv).await,
                        None => {
                            debug!("advertisement channel closed");
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn handle_advertisement(&mut self, adv: Advertisement) {
        let mac = adv.mac;

        let event = if !self.registry.is_authorized(&mac) {
            debug!(%mac, rssi = ?adv.rssi, "ignoring unknown device");
            AccessEvent::new(mac, AccessDecision::UnknownDevice, None)
        } else if !self.cooldown.try_acquire(&mac) {
            debug!(%mac, "device inside cooldown window");
            AccessEvent::new(mac, AccessDecision::CoolingDown, None)
        } else {
            let credential = derive_credential(&mac, &self.policy);
            let label = self
                .registry
                .lookup(&mac)
                .and_then(|d| d.label.clone())
                .unwrap_or_default();

            // The send blocks for the full pulse train; hop off the async
            // worker so the runtime keeps breathing.
            let sent = tokio::task::block_in_place(|| self.transmitter.send(&credential));

            info!(
                %mac,
                label = %label,
                credential = %credential,
                bits = sent.bits_sent,
                "credential transmitted"
            );
            AccessEvent::new(mac, AccessDecision::Granted, Some(credential))
        };

        // Event delivery is observability, not control flow: a dropped
        // receiver must not stall the door.
        if self.events_tx.send(event).await.is_err() {
            warn!("access event receiver dropped");
        }
    }
}
