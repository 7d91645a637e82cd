mod commands;
mod config;
mod logging;

use clap::{Parser, Subcommand, ValueEnum};
use gatelink_core::WiegandFormat;
use std::path::PathBuf;

use crate::logging::{LogLevel, init_logging};

#[derive(Parser, Debug)]
#[command(name = "gatelink", version, about = "BLE presence to Wiegand access bridge")]
struct Cli {
    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Emit machine-readable JSON on stdout instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Credential format selector on the command line.
#[derive(Copy, Clone, Debug, ValueEnum)]
enum FormatArg {
    W26,
    W34,
    Em4100,
}

impl From<FormatArg> for WiegandFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::W26 => WiegandFormat::W26,
            FormatArg::W34 => WiegandFormat::W34,
            FormatArg::Em4100 => WiegandFormat::Em4100,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a 26-bit Wiegand credential over the emulated line pair.
    Send26 {
        /// Facility code (0-255).
        facility: u8,
        /// Card number (0-65535).
        card: u16,
        /// Pace pulses with real 50 µs / 1 ms waits instead of the
        /// virtual clock.
        #[arg(long)]
        real_time: bool,
    },

    /// Send a 34-bit Wiegand credential over the emulated line pair.
    Send34 {
        /// Facility code (0-65535).
        facility: u16,
        /// Card number (0-65535).
        card: u16,
        #[arg(long)]
        real_time: bool,
    },

    /// Send a 40-bit EM4100 credential over the emulated line pair.
    SendEm4100 {
        /// Version / customer byte (decimal or 0x-prefixed hex).
        #[arg(value_parser = parse_u8_lenient)]
        version: u8,
        /// 32-bit card id (decimal or 0x-prefixed hex).
        #[arg(value_parser = parse_u32_lenient)]
        card_id: u32,
        #[arg(long)]
        real_time: bool,
    },

    /// Send a pre-packed payload at an explicit bit count.
    SendRaw {
        /// Packed payload (decimal or 0x-prefixed hex).
        #[arg(value_parser = parse_u64_lenient)]
        data: u64,
        /// Total bits on the wire: 26, 34, or 40.
        bits: u8,
        /// Mark the payload as carrying a facility code (informational).
        #[arg(long)]
        with_facility_code: bool,
        #[arg(long)]
        real_time: bool,
    },

    /// Pre-calculate the credentials a BLE MAC address maps to.
    Derive {
        /// MAC address (any common separator style).
        mac: String,
        /// Restrict output to one format; all three by default.
        #[arg(long, value_name = "FORMAT")]
        format: Option<FormatArg>,
        /// Facility code for the 26-bit mapping.
        #[arg(long, default_value_t = 123)]
        facility_code: u8,
    },

    /// Run the emulated bridge: replay MAC sightings through the
    /// authorization/cooldown pipeline and report every decision.
    Watch {
        /// Configuration file (JSON).
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// MAC addresses to replay; defaults to the configured devices.
        macs: Vec<String>,
        /// Number of replay rounds.
        #[arg(long, default_value_t = 1)]
        repeat: u32,
        /// Pause between sightings in milliseconds.
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
    },
}

fn parse_u64_lenient(s: &str) -> Result<u64, String> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).map_err(|e| e.to_string()),
        None => s.parse().map_err(|e: std::num::ParseIntError| e.to_string()),
    }
}

fn parse_u32_lenient(s: &str) -> Result<u32, String> {
    parse_u64_lenient(s)?
        .try_into()
        .map_err(|_| "value exceeds 32 bits".to_string())
}

fn parse_u8_lenient(s: &str) -> Result<u8, String> {
    parse_u64_lenient(s)?
        .try_into()
        .map_err(|_| "value exceeds 8 bits".to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match cli.command {
        Command::Send26 {
            facility,
            card,
            real_time,
        } => commands::send26(facility, card, real_time, cli.json),
        Command::Send34 {
            facility,
            card,
            real_time,
        } => commands::send34(facility, card, real_time, cli.json),
        Command::SendEm4100 {
            version,
            card_id,
            real_time,
        } => commands::send_em4100(version, card_id, real_time, cli.json),
        Command::SendRaw {
            data,
            bits,
            with_facility_code,
            real_time,
        } => commands::send_raw(data, bits, with_facility_code, real_time, cli.json),
        Command::Derive {
            mac,
            format,
            facility_code,
        } => commands::derive(&mac, format.map(Into::into), facility_code, cli.json),
        Command::Watch {
            config,
            macs,
            repeat,
            interval_ms,
        } => commands::watch(config, macs, repeat, interval_ms, cli.json).await,
    }
}
