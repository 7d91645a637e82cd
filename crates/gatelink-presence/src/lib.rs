//! BLE presence layer for the Gatelink access bridge.
//!
//! This crate is the glue between a BLE scanner and the Wiegand
//! transmitter: it models observed advertisements, decides which devices
//! are authorized, derives the credential a device maps to, rate-limits
//! repeat triggers, and serializes transmissions through a single watcher
//! task.
//!
//! # Flow
//!
//! ```text
//! scanner ──Advertisement──► PresenceWatcher ──pulses──► Wiegand lines
//!                                 │
//!                                 └──AccessEvent──► observers
//! ```
//!
//! The watcher owns the transmitter exclusively. Because a Wiegand send is
//! a blocking ~30–40 ms critical section, the watcher is the mutual-
//! exclusion boundary the transmitter's contract requires: advertisements
//! queue on a channel and are handled strictly one at a time.

pub mod advertisement;
pub mod cooldown;
pub mod derive;
pub mod registry;
pub mod watcher;

pub use advertisement::Advertisement;
pub use cooldown::CooldownTracker;
pub use derive::{CredentialPolicy, derive_credential};
pub use registry::{DeviceRegistry, RegisteredDevice};
pub use watcher::{AccessDecision, AccessEvent, PresenceWatcher, WatcherHandle};
