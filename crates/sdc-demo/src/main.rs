use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sdc_crypto::KdfParams;
use sdc_store::{IndexedContainer, ScanContainer, SecureDataContainer, StoreConfig, StoreError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "sdc-demo")]
#[command(about = "Walkthrough of the secure data containers", long_about = None)]
struct Cli {
    /// JSON config file with KDF cost settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the minimum KDF costs (ignored when --config is given)
    #[arg(long, global = true)]
    fast: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Two users storing, sharing and removing items
    Scenario {
        /// Container variant; both run when omitted
        #[arg(long, value_enum)]
        variant: Option<Variant>,
    },

    /// Trigger every failure signal once
    Errors {
        #[arg(long, value_enum)]
        variant: Option<Variant>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Variant {
    Scan,
    Indexed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Entry {
    Text(String),
    Number(i64),
}

fn text(value: &str) -> Entry {
    Entry::Text(value.to_string())
}

type Container = Box<dyn SecureDataContainer<Entry>>;

fn build(variant: Variant, config: &StoreConfig) -> Result<Container> {
    let container: Container = match variant {
        Variant::Scan => Box::new(ScanContainer::new(config)?),
        Variant::Indexed => Box::new(IndexedContainer::new(config)?),
    };
    Ok(container)
}

fn load_config(cli: &Cli) -> Result<StoreConfig> {
    match &cli.config {
        Some(path) => StoreConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display())),
        None if cli.fast => Ok(StoreConfig::new(KdfParams::minimum())?),
        None => Ok(StoreConfig::default()),
    }
}

fn scenario(c: &mut Container) -> Result<()> {
    c.create_user("bob", "123")?;
    c.create_user("alice", "abc")?;

    for value in ["Pummarola", "Pasta", "Mozzarella"] {
        let id = c.put("bob", "123", &text(value))?;
        info!(owner = "bob", item = %id, value, "stored");
    }
    c.put("alice", "abc", &Entry::Number(91101))?;
    println!("bob has {} items, alice has {}", c.size("bob", "123")?, c.size("alice", "abc")?);

    c.share("bob", "123", "alice", &text("Pasta"))?;
    println!("alice reads shared item: {:?}", c.get("alice", "abc", &text("Pasta"))?);

    let copy = c.copy("alice", "abc", &text("Pasta"))?;
    println!("alice copied it as {copy}");

    let removed = c.remove("bob", "123", &text("Pummarola"))?;
    println!("bob removed {removed:?}");

    for (user, password) in [("bob", "123"), ("alice", "abc")] {
        let values: Vec<Entry> = c.iter(user, password)?.collect();
        println!("{user}: {values:?}");
    }
    Ok(())
}

fn report(label: &str, result: Result<(), StoreError>) {
    match result {
        Ok(()) => warn!(label, "expected a failure"),
        Err(err) => println!("{label:<28} -> {err}"),
    }
}

fn errors(c: &mut Container) -> Result<()> {
    c.create_user("bob", "123")?;
    c.create_user("alice", "abc")?;
    c.put("bob", "123", &text("Pasta"))?;

    report("empty owner", c.size("", "123").map(drop));
    report("wrong password", c.size("bob", "nope").map(drop));
    report("unknown identity", c.size("mallory", "123").map(drop));
    report("duplicate identity", c.create_user("bob", "456"));
    report("missing item", c.get("alice", "abc", &text("Pasta")).map(drop));
    report("share with unknown user", c.share("bob", "123", "carol", &text("Pasta")));
    report("share with self", c.share("bob", "123", "bob", &text("Pasta")));
    report("copy unreachable item", c.copy("alice", "abc", &text("Pasta")).map(drop));
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sdc_demo=info,sdc_store=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    info!(kdf = ?config.kdf, "configuration loaded");

    let (variant, run_errors) = match cli.command {
        Commands::Scenario { variant } => (variant, false),
        Commands::Errors { variant } => (variant, true),
    };
    let variants = match variant {
        Some(v) => vec![v],
        None => vec![Variant::Scan, Variant::Indexed],
    };

    for variant in variants {
        println!("== {variant:?} container ==");
        let mut container = build(variant, &config)?;
        if run_errors {
            errors(&mut container)?;
        } else {
            scenario(&mut container)?;
        }
    }
    Ok(())
}
