use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use embedded_io_adapters::std::FromStd;
use log::{Level, info};
use rscp_protocol::commands::{HistoryType, HistoryWindow, PowerBounds, PowerMode};
use rscp_protocol::types::{Watt, WattHours};
use rscp_protocol::{Orchestrator, Query, Session, Timestamp};

mod config;
mod dictionary;
mod output;
mod transport;

use config::Config;
use dictionary::FileDictionary;
use transport::DeviceStream;

/// A command line tool to talk to E3/DC storage systems over RSCP
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file
    #[arg(long, default_value = "rscp.toml")]
    config: PathBuf,

    /// Override the server address of the configuration
    #[arg(long)]
    host: Option<String>,

    /// Override the server port of the configuration
    #[arg(long)]
    port: Option<u16>,

    /// Override the receive timeout in milliseconds
    #[arg(long)]
    timeout: Option<u64>,

    /// More output, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read tags given by name or number
    Read {
        #[arg(required = true)]
        tags: Vec<String>,
    },
    /// Battery state including every battery module
    Battery,
    /// Show the current power limits
    PowerSettings,
    /// Set the charge and discharge power limits
    SetPower {
        /// Maximum charge power in W
        #[arg(short, long, requires = "discharge", required_unless_present = "automatic")]
        charge: Option<u32>,
        /// Maximum discharge power in W
        #[arg(short, long, requires = "charge")]
        discharge: Option<u32>,
        /// Let the device choose the limits
        #[arg(short, long, conflicts_with_all = ["charge", "discharge"])]
        automatic: bool,
    },
    /// Charge the battery from the grid
    ManualCharge {
        /// Energy in Wh
        energy: u32,
    },
    /// Energy history of a day, week, month or year
    History {
        /// day, week, month or year
        kind: String,
        /// Any date inside the period, YYYY-MM-DD, today if not given
        date: Option<String>,
    },
}

impl Commands {
    /// Validate the arguments before anything is sent
    fn into_query(self, dictionary: &FileDictionary, bounds: &PowerBounds) -> anyhow::Result<Query> {
        let query = match self {
            Commands::Read { tags } => Query::ReadTags(
                tags.iter()
                    .map(|name| dictionary.resolve(name))
                    .collect::<Result<_, _>>()?,
            ),
            Commands::Battery => Query::ModuleDump,
            Commands::PowerSettings => Query::GetPowerSettings,
            Commands::SetPower {
                charge,
                discharge,
                automatic,
            } => {
                let mode = match (automatic, charge, discharge) {
                    (true, _, _) => PowerMode::Automatic,
                    (false, Some(charge), Some(discharge)) => PowerMode::Manual {
                        charge: Watt(charge),
                        discharge: Watt(discharge),
                    },
                    _ => bail!("Both --charge and --discharge are required without --automatic"),
                };
                Query::PowerSettings(bounds.check_mode(mode)?)
            }
            Commands::ManualCharge { energy } => {
                Query::ManualCharge(bounds.check_charge_energy(WattHours(energy))?)
            }
            Commands::History { kind, date } => {
                let window = match date {
                    Some(date) => HistoryWindow::parse(&kind, &date)?,
                    None => HistoryWindow::new(kind.parse::<HistoryType>()?, Utc::now().date_naive()),
                };
                Query::History(window)
            }
        };
        Ok(query)
    }
}

fn log_level(verbose: u8, debug: bool) -> Level {
    match verbose {
        0 if debug => Level::Debug,
        0 => Level::Warn,
        1 => Level::Info,
        2 => Level::Debug,
        _ => Level::Trace,
    }
}

fn now() -> Timestamp {
    let now = Utc::now();
    Timestamp {
        seconds: now.timestamp(),
        nanoseconds: now.timestamp_subsec_nanos() as i32,
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    if let Some(host) = args.host {
        config.server_ip = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_ms = timeout;
    }
    simple_logger::init_with_level(log_level(args.verbose, config.debug))
        .context("Failed to set up logging")?;

    let dictionary = match &config.dictionary {
        Some(path) => FileDictionary::load(path)?,
        None => FileDictionary::default(),
    };
    let query = args.command.into_query(&dictionary, &config.bounds())?;

    info!("Connecting to {}:{}", config.server_ip, config.server_port);
    let stream = DeviceStream::connect(
        &config.server_ip,
        config.server_port,
        Duration::from_millis(config.timeout_ms),
    )?;

    let orchestrator = Orchestrator::new(config.credentials(), [query]);
    let mut session = Session::new(
        FromStd::new(stream),
        config.aes_password.as_bytes(),
        orchestrator,
        &dictionary,
    )
    .with_clock(now);
    let result = session.run(Some(config.retries), |output| {
        println!("{}", output::format_output(&dictionary, &output));
    });

    let stream = session.into_inner().into_inner();
    if let Err(e) = stream.shutdown() {
        log::debug!("Shutdown failed: {e}");
    }
    result.context("Session failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rscp_protocol::tags;

    fn query(args: &[&str]) -> anyhow::Result<Query> {
        let args = Args::try_parse_from([&["rscpcli"][..], args].concat())?;
        args.command
            .into_query(&FileDictionary::default(), &PowerBounds::default())
    }

    #[test]
    fn test_read() {
        assert_eq!(
            query(&["read", "EMS_REQ_POWER_PV", "0x03000001"]).unwrap(),
            Query::ReadTags(vec![tags::EMS_REQ_POWER_PV, tags::BAT_REQ_RSOC])
        );
        assert!(query(&["read", "NO_SUCH_TAG"]).is_err());
        assert!(query(&["read"]).is_err());
    }

    #[test]
    fn test_set_power() {
        assert_eq!(
            query(&["set-power", "-c", "2000", "-d", "1500"]).unwrap(),
            Query::PowerSettings(PowerMode::Manual {
                charge: Watt(2000),
                discharge: Watt(1500)
            })
        );
        assert_eq!(
            query(&["set-power", "-a"]).unwrap(),
            Query::PowerSettings(PowerMode::Automatic)
        );
        assert!(query(&["set-power", "-a", "-c", "100"]).is_err());
        assert!(query(&["set-power", "-c", "100"]).is_err());
        assert!(query(&["set-power", "-c", "3001", "-d", "100"]).is_err());
    }

    #[test]
    fn test_manual_charge_bounds() {
        assert_eq!(
            query(&["manual-charge", "500"]).unwrap(),
            Query::ManualCharge(WattHours(500))
        );
        assert!(query(&["manual-charge", "50"]).is_err());
    }

    #[test]
    fn test_history() {
        let Query::History(window) = query(&["history", "week", "2024-11-20"]).unwrap() else {
            panic!("not a history query");
        };
        assert_eq!(window.start, 1_731_888_000);
        assert!(query(&["history", "decade", "2024-11-20"]).is_err());
        assert!(query(&["history", "day", "20.11.2024"]).is_err());
        assert!(query(&["history", "month"]).is_ok());
    }

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(0, false), Level::Warn);
        assert_eq!(log_level(0, true), Level::Debug);
        assert_eq!(log_level(1, false), Level::Info);
        assert_eq!(log_level(5, false), Level::Trace);
    }
}
