//! Command-line interface for zabbix-audit-ship
//!
//! # Usage Examples
//!
//! ```bash
//! # Ship new audit entries, resuming from /tmp/zabbixaudit
//! zabbix-audit-ship ship \
//!   --zhost db --zdb zabbix --zuser zabbix --zpass secret \
//!   --splunk-url https://splunk:8089 --splunk-user admin --splunk-password changeme \
//!   --index zabbix_audit --host zabbix-prod
//!
//! # Re-ship everything after entry 1200 without touching the stored checkpoint first
//! zabbix-audit-ship ship ... --continue 1200
//!
//! # Render the pending events without sending them
//! zabbix-audit-ship ship ... --dry-run
//!
//! # Inspect / override the checkpoint
//! zabbix-audit-ship checkpoint show
//! zabbix-audit-ship checkpoint set 1200
//! ```

use anyhow::Context;
use audit_types::{AuditCheckpoint, Position};
use checkpoint::{CheckpointManager, CheckpointOrigin, FilesystemStore};
use clap::{Parser, Subcommand};
use splunk_sink::{DryRunConnector, EventFormatter, SinkConnector, SplunkConnector, SplunkOpts};
use tracing::warn;
use zabbix_audit_ship::{CheckpointOpts, Pipeline, SplunkArgs, StartFrom, ZabbixOpts};
use zabbix_audit_source::MySQLSourceConnector;

#[derive(Parser)]
#[command(name = "zabbix-audit-ship")]
#[command(about = "Ship Zabbix audit log entries to a Splunk index")]
#[command(long_about = None)]
struct Cli {
    #[command(flatten)]
    checkpoint: CheckpointOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ship every audit entry newer than the checkpoint, then advance it
    Ship {
        /// Zabbix database options
        #[command(flatten)]
        zabbix: ZabbixOpts,

        /// Splunk options
        #[command(flatten)]
        splunk: SplunkArgs,

        /// Start after this audit id instead of the stored checkpoint
        #[arg(long = "continue", value_name = "POSITION")]
        continue_from: Option<Position>,

        /// Read and render events without sending them or saving the checkpoint
        #[arg(long)]
        dry_run: bool,
    },

    /// Inspect or override the stored checkpoint
    Checkpoint {
        #[command(subcommand)]
        command: CheckpointCommand,
    },
}

#[derive(Subcommand)]
enum CheckpointCommand {
    /// Print the stored checkpoint
    Show,
    /// Replace the stored checkpoint, e.g. to re-ship older entries
    Set {
        /// Audit id of the last entry considered shipped
        position: Position,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let store = FilesystemStore::new(&cli.checkpoint.checkpoint_file);

    match cli.command {
        Commands::Ship {
            zabbix,
            splunk,
            continue_from,
            dry_run,
        } => {
            let source = MySQLSourceConnector::new(zabbix.to_source_opts()?);
            let splunk = SplunkOpts::from(&splunk);
            let from = continue_from.map_or(StartFrom::Checkpoint, StartFrom::Position);

            if dry_run {
                let sink =
                    DryRunConnector::new(EventFormatter::new(splunk.timezone), splunk.index.clone());
                ship(store, source, sink, from, true).await
            } else {
                ship(store, source, SplunkConnector::new(splunk), from, false).await
            }
        }
        Commands::Checkpoint { command } => {
            let manager = CheckpointManager::<_, AuditCheckpoint>::new(store);
            match command {
                CheckpointCommand::Show => {
                    let loaded = manager.load().await;
                    match loaded.origin {
                        CheckpointOrigin::Stored => println!("{}", loaded.checkpoint.position),
                        CheckpointOrigin::Missing => {
                            println!("{} (no checkpoint stored)", loaded.checkpoint.position)
                        }
                        CheckpointOrigin::Recovered { reason } => println!(
                            "{} (stored checkpoint unreadable: {reason})",
                            loaded.checkpoint.position
                        ),
                    }
                    Ok(())
                }
                CheckpointCommand::Set { position } => {
                    manager
                        .save(&AuditCheckpoint::new(position))
                        .await
                        .with_context(|| {
                            format!(
                                "Failed to write checkpoint to {}",
                                cli.checkpoint.checkpoint_file.display()
                            )
                        })?;
                    println!("Checkpoint set to {position}");
                    Ok(())
                }
            }
        }
    }
}

async fn ship<K: SinkConnector>(
    store: FilesystemStore,
    source: MySQLSourceConnector,
    sink: K,
    from: StartFrom,
    dry_run: bool,
) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(store, source, sink).dry_run(dry_run);
    let report = pipeline.run(from).await?;
    if report.checkpoint_recovered {
        warn!("Started from the beginning because the stored checkpoint was unreadable");
    }
    println!("{report}");
    Ok(())
}
