//! Binary entrypoint for the deskpet CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml` and seed all records
//! - `status` - print the pet's level, experience, and gauges
//! - `exp <amount>` - grant experience
//! - `feed <item>` - consume one item and apply its effect
//! - `inventory [--kind <type>]` - list items
//! - `give <item> [count]` - restock an existing catalog item
//! - `settings [get <section> | reset]` - inspect or reset preferences
//! - `backups` / `restore <backup> <record>` - manual recovery
//!
//! See the library crate docs for module-level details: `deskpet::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;

use deskpet::config::Config;
use deskpet::repository::settings::SettingsKey;
use deskpet::service::{PetService, Reply};
use deskpet::types::ItemType;

#[derive(Parser)]
#[command(name = "deskpet")]
#[command(about = "Durable state core for a desktop companion")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Storage root override
    #[arg(long, global = true)]
    root: Option<String>,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a default configuration and seed the records
    Init,
    /// Show the pet's current state
    Status,
    /// Grant experience points
    Exp { amount: u64 },
    /// Feed the pet one item from the inventory
    Feed { item: String },
    /// List inventory items
    Inventory {
        /// Only show items of this type (food, toy, decoration)
        #[arg(short, long)]
        kind: Option<ItemType>,
    },
    /// Add stock to an existing inventory item
    Give {
        item: String,
        #[arg(default_value_t = 1)]
        count: u32,
    },
    /// Show or reset settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
    /// List backup snapshots
    Backups,
    /// Restore a backup snapshot over a live record
    Restore { backup: String, record: String },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print one top-level section
    Get { section: SettingsKey },
    /// Restore compiled-in defaults
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Defaults apply only when the config file is absent
    let config = Config::load_if_present(&cli.config).await?;
    init_logging(&config, cli.verbose);

    let root = cli
        .root
        .clone()
        .or_else(|| config.as_ref().map(|c| c.storage.root.clone()))
        .unwrap_or_else(|| Config::default().storage.root);
    let mut service = PetService::open(&root);

    match cli.command {
        Commands::Init => {
            if std::path::Path::new(&cli.config).exists() {
                info!("Config {} already exists, leaving it untouched", cli.config);
            } else {
                Config::create_default(&cli.config).await?;
                println!("Created {}", cli.config);
            }
            expect(service.load_pet().await)?;
            expect(service.inventory_items().await)?;
            expect(service.load_settings().await)?;
            println!("Records seeded under {}", root);
        }
        Commands::Status => {
            let pet = expect(service.load_pet().await)?;
            let basic = &pet.data.basic;
            let status = &pet.data.status;
            println!(
                "{} - level {} ({}/{} exp)",
                basic.name, basic.level, basic.experience, basic.next_level_exp
            );
            println!(
                "hunger {}  happiness {}  energy {}  health {}",
                status.hunger, status.happiness, status.energy, status.health
            );
            println!("last fed {}", pet.data.timers.last_feed_time.to_rfc3339());
        }
        Commands::Exp { amount } => {
            if expect(service.add_experience(amount).await)? {
                println!("Level up!");
            }
            let basic = expect(service.load_pet().await)?.data.basic;
            println!(
                "Level {} ({}/{} exp)",
                basic.level, basic.experience, basic.next_level_exp
            );
        }
        Commands::Feed { item } => {
            let outcome = expect(service.feed_with_item(&item).await)?;
            println!("Fed {} ({} left)", outcome.item.name, outcome.item.count);
            print_json(&outcome.pet.data.status)?;
        }
        Commands::Inventory { kind } => {
            let items = match kind {
                Some(kind) => expect(service.inventory_items_by_type(kind).await)?,
                None => expect(service.inventory_items().await)?,
            };
            for item in items {
                println!(
                    "{:<12} {:<10} x{:<4} {}",
                    item.id, item.kind, item.count, item.description
                );
            }
        }
        Commands::Give { item, count } => {
            if expect(service.add_item(&item, count).await)? {
                println!("Added {} x{}", item, count);
            } else {
                println!("No catalog item named {}", item);
            }
        }
        Commands::Settings { action } => match action {
            None => print_json(&expect(service.load_settings().await)?)?,
            Some(SettingsAction::Get { section }) => {
                print_json(&expect(service.get_setting(section).await)?)?
            }
            Some(SettingsAction::Reset) => {
                expect(service.reset_settings().await)?;
                println!("Settings reset");
            }
        },
        Commands::Backups => {
            for backup in expect(service.list_backups().await)? {
                println!("{}  {} bytes", backup.name, backup.size_bytes);
            }
        }
        Commands::Restore { backup, record } => {
            expect(service.restore_backup(&backup, &record).await)?;
            println!("Restored {} -> {}", backup, record);
        }
    }

    Ok(())
}

fn expect<T>(reply: Reply<T>) -> Result<T> {
    match (reply.success, reply.data) {
        (true, Some(data)) => Ok(data),
        _ => {
            let message = reply.error.unwrap_or_else(|| "operation failed".to_string());
            Err(anyhow!(message))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides config
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .map(|c| c.logging.level_filter())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    if let Some(f) = log_file {
        let file = std::sync::Mutex::new(f);
        // Mirror to the console only when someone is watching
        let is_tty = atty::is(atty::Stream::Stderr);
        builder.format(move |fmt, record| {
            let line = format!(
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            );
            if let Ok(mut guard) = file.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            writeln!(
                fmt,
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            )
        });
    }
    let _ = builder.try_init();
}
