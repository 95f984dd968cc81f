use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use chrono::NaiveDateTime;
use clap::{Parser, ValueEnum};
use netrap_core::{Report, Thresholds};
use netrap_sdk::{Inventory, ReportContext, TIMESTAMP_FORMAT};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "netrap",
    version,
    about = "Network inventory report",
    author = "netrap developers"
)]
struct Cli {
    /// Inventory JSON to read
    #[arg(long, default_value = "network_devices.json")]
    input: PathBuf,

    /// Where to write the report; `-` prints to stdout
    #[arg(long, default_value = "report.txt")]
    output: String,

    /// Output format: text or json
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    thresholds: ThresholdArgs,

    /// Fixed generation time, "YYYY-MM-DD HH:MM"
    #[arg(long, value_parser = parse_now)]
    now: Option<NaiveDateTime>,
}

#[derive(clap::Args, Debug)]
struct ThresholdArgs {
    /// Port utilization flagged as high (fraction)
    #[arg(long)]
    port_warning: Option<f64>,

    /// Port utilization flagged as critical (fraction)
    #[arg(long)]
    port_critical: Option<f64>,

    /// Uptime in days below which a device is listed
    #[arg(long)]
    low_uptime: Option<f64>,

    /// Uptime in days below which a device is critical
    #[arg(long)]
    critical_uptime: Option<f64>,

    /// Uptime in days counted as a recent restart
    #[arg(long)]
    fresh_uptime: Option<f64>,

    /// Client count at which an access point is overloaded
    #[arg(long)]
    ap_overload: Option<i64>,
}

impl ThresholdArgs {
    fn resolve(&self) -> Result<Thresholds> {
        let defaults = Thresholds::default();
        let thresholds = Thresholds {
            port_warning: self.port_warning.unwrap_or(defaults.port_warning),
            port_critical: self.port_critical.unwrap_or(defaults.port_critical),
            low_uptime_days: self.low_uptime.unwrap_or(defaults.low_uptime_days),
            critical_uptime_days: self
                .critical_uptime
                .unwrap_or(defaults.critical_uptime_days),
            fresh_uptime_days: self.fresh_uptime.unwrap_or(defaults.fresh_uptime_days),
            ap_overload_clients: self.ap_overload.unwrap_or(defaults.ap_overload_clients),
        };
        thresholds.validate()?;
        Ok(thresholds)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_now(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
        .map_err(|err| format!("expected \"YYYY-MM-DD HH:MM\": {err}"))
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let thresholds = cli.thresholds.resolve()?;
    let raw = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read inventory {}", cli.input.display()))?;
    let decoded = Inventory::from_json_str(&raw)
        .with_context(|| format!("failed to load inventory {}", cli.input.display()))?;
    for issue in &decoded.issues {
        warn!(kind = issue.kind(), "{issue}");
    }

    let context = cli.now.map(ReportContext::new).unwrap_or_else(ReportContext::now);
    let report = Report::with_thresholds(&decoded.inventory, &context, thresholds)
        .with_issues(decoded.issues);

    let rendered = match cli.format {
        OutputFormat::Text => report.to_text()?,
        OutputFormat::Json => {
            let mut payload = serde_json::to_string_pretty(&report.to_json_value())?;
            payload.push('\n');
            payload
        }
    };

    if cli.output == "-" {
        print!("{rendered}");
    } else {
        fs::write(&cli.output, &rendered)
            .with_context(|| format!("failed to write report {}", cli.output))?;
        info!(path = %cli.output, "report written");
        println!("Rapport sparad till {}", cli.output);
    }

    Ok(())
}
