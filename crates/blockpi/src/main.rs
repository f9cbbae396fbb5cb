//! blockpi - command-line entry point
//!
//! Signs messages, inspects keys and signatures, and runs the local
//! counter/signing drill.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blockpi::{drill, HarnessConfig, RootModule};
use blockpi_core::{recover_address, sign, PrivateKey};

#[derive(Parser)]
#[command(name = "blockpi")]
#[command(about = "Message signing and atomic counters for blockchain load tests", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (JSON); must exist. Defaults to $BLOCKPI_CONFIG if set
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign a message with Keccak-256 + secp256k1
    Sign {
        /// Private key (hex), `-` to read it from stdin; the configured env var when omitted
        #[arg(short, long)]
        key: Option<String>,

        /// Message to sign
        #[arg(short, long)]
        message: String,
    },

    /// Print the address of a private key
    Address {
        /// Private key (hex), `-` to read it from stdin; the configured env var when omitted
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Recover the signer address of a signature
    Recover {
        /// Message that was signed
        #[arg(short, long)]
        message: String,

        /// Signature (0x-prefixed hex, 65 bytes)
        #[arg(short, long)]
        signature: String,
    },

    /// Run virtual users on local threads and print the counters
    Drill {
        /// Override the number of virtual users
        #[arg(long)]
        vus: Option<u64>,

        /// Override iterations per virtual user
        #[arg(short = 'n', long)]
        iterations: Option<u64>,

        /// Recover every signature and count mismatches
        #[arg(long)]
        verify: bool,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Output path
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = HarnessConfig::resolve(cli.config.as_deref())
        .with_context(|| format!("loading config {:?}", cli.config))?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Sign { key, message } => {
            let key = config.resolve_private_key(key.as_deref(), std::io::stdin())?;
            println!("{}", sign(&key, message.as_bytes())?);
        }

        Commands::Address { key } => {
            let key = config.resolve_private_key(key.as_deref(), std::io::stdin())?;
            println!("{}", PrivateKey::from_hex(&key)?.address());
        }

        Commands::Recover { message, signature } => {
            println!("{}", recover_address(message.as_bytes(), &signature)?);
        }

        Commands::Drill {
            vus,
            iterations,
            verify,
        } => {
            let mut config = config;
            if let Some(vus) = vus {
                config.vus = vus;
            }
            if let Some(iterations) = iterations {
                config.iterations = iterations;
            }
            config.verify_signatures |= verify;

            let key = config.private_key()?;
            let report = drill::run(&config, &key, RootModule::new())?;

            println!(
                "{} vus x {} iterations in {:.3}s ({:.1} signatures/s)",
                report.vus,
                report.iterations,
                report.elapsed.as_secs_f64(),
                report.throughput()
            );
            for (name, value) in &report.counters {
                println!("  {:<16} {}", name, value);
            }
        }

        Commands::InitConfig { path } => {
            HarnessConfig::default().save(&path)?;
            info!("Wrote default config to {:?}", path);
        }
    }

    Ok(())
}
