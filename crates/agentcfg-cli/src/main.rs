//! agentcfg CLI - Inspect the device agent's configuration registry

use agentcfg_schema::{schema, DescriptorSummary, KeySource};
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "agentcfg")]
#[command(about = "agentcfg - Device agent configuration registry")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered keys
    Keys {
        /// Only keys read from this source
        #[arg(short, long, value_enum)]
        source: Option<SourceArg>,
        /// Print full descriptors as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the validator, default policy, source and kind of a key
    Describe {
        /// Key name
        key: String,
    },
    /// Dry-run resolution of one raw value
    Resolve {
        /// Key name
        key: String,
        /// Raw value; omit to resolve the default
        #[arg(long)]
        raw: Option<String>,
        /// Parse --raw as JSON instead of taking it as a string
        #[arg(long, requires = "raw")]
        json_raw: bool,
    },
    /// Print the stored representation of a value
    Encode {
        /// Key name
        key: String,
        /// Value as JSON
        value: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceArg {
    Env,
    Database,
    Function,
}

impl From<SourceArg> for KeySource {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Env => KeySource::Environment,
            SourceArg::Database => KeySource::Database,
            SourceArg::Function => KeySource::Function,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let registry = schema();
    debug!("Registry loaded with {} keys", registry.len());

    match cli.command {
        Some(Commands::Keys { source, json }) => {
            let summaries: Vec<DescriptorSummary> = registry
                .descriptors()
                .filter(|d| source.map_or(true, |s| d.source() == KeySource::from(s)))
                .map(|d| d.summary())
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                for summary in &summaries {
                    println!("{:<26} {:<12} {}", summary.name, summary.source, summary.policy);
                }
            }
        }
        Some(Commands::Describe { key }) => {
            let summary = registry.lookup(&key)?.summary();
            println!("key:       {}", summary.name);
            println!("source:    {}", summary.source);
            println!("kind:      {}", summary.kind);
            println!("validator: {}", summary.validator);
            println!("policy:    {}", summary.policy);
            if let Some(default) = &summary.default {
                println!("default:   {}", default);
            }
        }
        Some(Commands::Resolve { key, raw, json_raw }) => {
            let raw = match raw {
                Some(text) if json_raw => Some(
                    serde_json::from_str::<Value>(&text)
                        .with_context(|| format!("--raw is not valid JSON: {}", text))?,
                ),
                Some(text) => Some(Value::String(text)),
                None => None,
            };
            let resolved = registry.resolve(&key, raw.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }
        Some(Commands::Encode { key, value }) => {
            let value: Value = serde_json::from_str(&value)
                .with_context(|| format!("value is not valid JSON: {}", value))?;
            let stored = registry.encode(&key, &value)?;
            println!("{}", stored);
        }
        None => {
            println!(
                "agentcfg v{} - {} keys registered. Use --help for commands",
                env!("CARGO_PKG_VERSION"),
                registry.len()
            );
        }
    }

    Ok(())
}
