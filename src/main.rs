mod feedback;
mod gateway;
mod recorder;
mod stats;

use clap::{Parser, Subcommand};
use sambo_channels::TelegramChannel;
use sambo_core::config;
use sambo_core::traits::{Channel, Generator};
use sambo_providers::DeepSeekGenerator;
use sambo_sheets::{RowStore, SheetsClient, Table};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "sambo",
    version,
    about = "🥋 Sambo — personal habit-tracking chat bot"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot.
    Start,
    /// Show what is configured and what is disabled.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Start => {
            let cfg = config::load(&cli.config)?;

            // Build channels.
            let mut channels: HashMap<String, Arc<dyn Channel>> = HashMap::new();

            if let Some(ref tg) = cfg.channel.telegram {
                if tg.enabled {
                    if tg.bot_token.is_empty() {
                        anyhow::bail!(
                            "Telegram is enabled but bot_token is empty. Set it in config.toml."
                        );
                    }
                    let channel = TelegramChannel::new(tg.clone());
                    channels.insert("telegram".to_string(), Arc::new(channel));
                }
            }

            if channels.is_empty() {
                anyhow::bail!("No channels enabled. Enable at least one channel in config.toml.");
            }

            // Build the row store against the remote spreadsheet.
            let store: Option<Arc<dyn RowStore>> = if cfg.sheets.is_configured() {
                let client = SheetsClient::new(&cfg.sheets);
                for table in Table::ALL {
                    if let Err(e) = client.ensure_schema(table).await {
                        // Startup survives a flaky sheet; the first write
                        // will surface the error to the user instead.
                        warn!("schema check for {} failed: {e}", table.title());
                    }
                }
                Some(Arc::new(client))
            } else {
                warn!("sheets backend not configured; recording is disabled");
                None
            };

            // Build the feedback generator.
            let generator: Option<Arc<dyn Generator>> = match cfg.provider.deepseek {
                Some(ref ds) if ds.enabled && !ds.api_key.is_empty() => {
                    Some(Arc::new(DeepSeekGenerator::new(ds.clone())))
                }
                _ => {
                    info!("no feedback generator configured; using the template");
                    None
                }
            };

            println!("🥋 Sambo — Starting bot...");
            let gw = Arc::new(gateway::Gateway::new(
                channels,
                store,
                generator,
                cfg.report.clone(),
            ));
            gw.run().await?;
        }
        Commands::Status => {
            let cfg = config::load(&cli.config)?;
            println!("🥋 Sambo — Status Check\n");
            println!("Config: {}", cli.config);
            println!();

            if let Some(ref tg) = cfg.channel.telegram {
                println!(
                    "  telegram: {}",
                    if tg.enabled && !tg.bot_token.is_empty() {
                        "configured"
                    } else if tg.enabled {
                        "enabled but missing bot_token"
                    } else {
                        "disabled"
                    }
                );
            } else {
                println!("  telegram: not configured");
            }

            println!(
                "  sheets: {}",
                if cfg.sheets.is_configured() {
                    "configured"
                } else if cfg.sheets.enabled {
                    "enabled but missing spreadsheet_id or api_token"
                } else {
                    "disabled"
                }
            );

            match cfg.provider.deepseek {
                Some(ref ds) => println!(
                    "  deepseek: {}",
                    if ds.enabled && !ds.api_key.is_empty() {
                        "configured"
                    } else if ds.enabled {
                        "enabled but missing api_key"
                    } else {
                        "disabled"
                    }
                ),
                None => println!("  deepseek: not configured (template feedback)"),
            }

            println!(
                "  weekly report: {}",
                if cfg.report.enabled {
                    format!(
                        "weekday {} at {:02}:00 Moscow time via {}",
                        cfg.report.weekday, cfg.report.hour, cfg.report.channel
                    )
                } else {
                    "disabled".to_string()
                }
            );
        }
    }

    Ok(())
}
