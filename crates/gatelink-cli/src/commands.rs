//! Subcommand implementations.

use crate::config::Config;
use anyhow::{Context, bail};
use gatelink_core::{Credential, MacAddress, WiegandFormat};
use gatelink_hardware::mock::{LineProbe, MockDelay, MockLinePair, MockPin};
use gatelink_hardware::{DelayUs, SpinDelay};
use gatelink_presence::{Advertisement, PresenceWatcher, derive_credential};
use gatelink_wiegand::{Transmission, WiegandTransmitter};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Delay source for emulated sends: the virtual clock by default, a real
/// spin wait when the operator wants wire-accurate pacing.
enum EmuDelay {
    Virtual(MockDelay),
    Real(SpinDelay),
}

impl DelayUs for EmuDelay {
    fn delay_us(&mut self, us: u32) {
        match self {
            EmuDelay::Virtual(d) => d.delay_us(us),
            EmuDelay::Real(d) => d.delay_us(us),
        }
    }
}

fn emulated_transmitter(
    real_time: bool,
    diagnostics: bool,
) -> (WiegandTransmitter<MockPin, EmuDelay>, LineProbe) {
    let (d0, d1, delay, probe) = MockLinePair::new();
    let delay = if real_time {
        EmuDelay::Real(SpinDelay::new())
    } else {
        EmuDelay::Virtual(delay)
    };
    let tx = WiegandTransmitter::new(d0, d1, delay).with_diagnostics(diagnostics);
    (tx, probe)
}

fn print_transmission(sent: &Transmission, probe: &LineProbe, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(sent)?);
        return Ok(());
    }

    println!("Format:       {}", sent.format);
    println!("Data:         0x{:X}", sent.data);
    if let Some(even) = sent.even_parity {
        println!("Even parity:  {}", u8::from(even));
    }
    if let Some(odd) = sent.odd_parity {
        println!("Odd parity:   {}", u8::from(odd));
    }
    println!("Bits:         {}", sent.bit_string);
    println!("Pulses:       {}", probe.pulse_count());
    Ok(())
}

pub fn send26(
    facility: u8,
    card: u16,
    real_time: bool,
    json: bool,
) -> anyhow::Result<()> {
    let (mut tx, probe) = emulated_transmitter(real_time, true);
    let sent = tx.send26(facility, card);
    print_transmission(&sent, &probe, json)
}

pub fn send34(
    facility: u16,
    card: u16,
    real_time: bool,
    json: bool,
) -> anyhow::Result<()> {
    let (mut tx, probe) = emulated_transmitter(real_time, true);
    let sent = tx.send34(facility, card);
    print_transmission(&sent, &probe, json)
}

pub fn send_em4100(
    version: u8,
    card_id: u32,
    real_time: bool,
    json: bool,
) -> anyhow::Result<()> {
    let (mut tx, probe) = emulated_transmitter(real_time, true);
    let sent = tx.send_em4100(version, card_id);
    print_transmission(&sent, &probe, json)
}

pub fn send_raw(
    data: u64,
    bits: u8,
    with_facility_code: bool,
    real_time: bool,
    json: bool,
) -> anyhow::Result<()> {
    let (mut tx, probe) = emulated_transmitter(real_time, true);
    let sent = tx
        .send_raw(data, bits, with_facility_code)
        .context("transmission rejected")?;
    print_transmission(&sent, &probe, json)
}

fn derived_for(mac: &MacAddress, format: WiegandFormat, facility_code: u8) -> Credential {
    derive_credential(
        mac,
        &gatelink_presence::CredentialPolicy {
            format,
            facility_code,
        },
    )
}

/// Pre-calculate the credentials a MAC address maps to, so the numbers can
/// be registered in the downstream controller before the device ever
/// approaches the door.
pub fn derive(
    mac: &str,
    format: Option<WiegandFormat>,
    facility_code: u8,
    json: bool,
) -> anyhow::Result<()> {
    let mac = MacAddress::parse(mac)?;
    let formats = match format {
        Some(f) => vec![f],
        None => vec![
            WiegandFormat::W26,
            WiegandFormat::W34,
            WiegandFormat::Em4100,
        ],
    };

    let credentials: Vec<Credential> = formats
        .iter()
        .map(|f| derived_for(&mac, *f, facility_code))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&credentials)?);
        return Ok(());
    }

    println!("MAC address:  {mac}");
    for credential in &credentials {
        match *credential {
            Credential::Wiegand26 { facility, card } => {
                println!("W26:     facility={facility} (0x{facility:02X})  card={card} (0x{card:04X})");
            }
            Credential::Wiegand34 { facility, card } => {
                println!("W34:     facility={facility} (0x{facility:04X})  card={card} (0x{card:04X})");
            }
            Credential::Em4100 { version, card_id } => {
                println!("EM4100:  version=0x{version:02X}  card_id=0x{card_id:08X}");
            }
        }
    }
    Ok(())
}

/// Run the emulated end-to-end bridge: replay MAC sightings through the
/// presence watcher and report every access decision.
pub async fn watch(
    config_path: Option<PathBuf>,
    macs: Vec<String>,
    repeat: u32,
    interval_ms: u64,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load(config_path.as_deref())?;

    let replay: Vec<MacAddress> = if macs.is_empty() {
        config.registry().iter().map(|d| d.mac).collect()
    } else {
        macs.iter()
            .map(|m| MacAddress::parse(m))
            .collect::<gatelink_core::Result<_>>()?
    };
    if replay.is_empty() {
        bail!("nothing to replay: pass MAC addresses or configure devices");
    }

    let (d0, d1, delay, probe) = MockLinePair::new();
    let transmitter = WiegandTransmitter::new(d0, d1, delay).with_diagnostics(config.diagnostics);
    probe.clear();

    let (watcher, mut handle) = PresenceWatcher::new(
        config.registry(),
        config.cooldown(),
        config.policy(),
        transmitter,
    );
    let watcher_task = tokio::spawn(watcher.run());

    info!(
        format = %config.format,
        pins = %config.pins,
        sightings = replay.len() as u64 * u64::from(repeat),
        "starting emulated watch"
    );

    let expected = replay.len() * repeat as usize;
    let mut sent = 0usize;
    for _ in 0..repeat {
        for mac in &replay {
            handle.advertise(Advertisement::new(*mac)).await?;
            sent += 1;
            if interval_ms > 0 && sent < expected {
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
            }
        }
    }

    for _ in 0..expected {
        let Some(event) = handle.next_event().await else {
            break;
        };
        if json {
            println!("{}", serde_json::to_string(&event)?);
        } else {
            let credential = event
                .credential
                .map(|c| format!("  [{c}]"))
                .unwrap_or_default();
            println!(
                "{}  {}  {}{}",
                event.at.format("%H:%M:%S%.3f"),
                event.mac,
                event.decision,
                credential
            );
        }
    }

    handle.shutdown();
    let _ = watcher_task.await;

    if !json {
        println!("{} pulses emitted across the run", probe.pulse_count());
    }
    Ok(())
}
