use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use reglint::config::{RemoteConfig, RunConfig};
use reglint::loader::Registry;
use reglint::transform::Fix;

mod commands;

use commands::{checksum_command, fix_command, migrate_command, remote_command, validate_command};

#[derive(Parser)]
#[command(
    name = "reglint",
    about = "Validates the curated token, oracle and vault registries",
    version,
    author,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding the registry JSON files
    #[arg(short, long, default_value = "data", env = "REGLINT_DATA_DIR", global = true)]
    data_dir: PathBuf,

    /// Enable verbose output (use -vv for debug output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run schema and consistency checks (default command)
    Validate {
        /// Also verify vaults, markets and curators against remote APIs
        #[arg(long)]
        remote: bool,

        #[command(flatten)]
        remote_config: RemoteConfig,
    },

    /// Run only the remote existence and risk checks
    Remote {
        #[command(flatten)]
        remote_config: RemoteConfig,
    },

    /// Print the EIP-55 checksum form of an address
    Checksum { address: String },

    /// Rewrite a registry file with a corrective transform
    Fix {
        #[arg(value_enum)]
        registry: Registry,

        #[arg(short, long, value_enum, default_value_t = Fix::Checksum)]
        transform: Fix,

        /// Remove only this curator (with --transform remove-curators)
        #[arg(long)]
        curator: Option<String>,

        /// Show the changes without writing the file
        #[arg(long)]
        dry_run: bool,
    },

    /// Build canonical registries from the legacy vendor lists
    Migrate {
        /// Directory holding the legacy lists
        #[arg(long, default_value = "legacy")]
        legacy_dir: PathBuf,

        /// Directory the canonical files are written to
        #[arg(long, default_value = "data")]
        out_dir: PathBuf,

        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_logging(cli.verbose);
    if let Ok(cwd) = std::env::current_dir() {
        reglint::loader::context::init_context(cwd);
    }

    match cli.command {
        Some(Commands::Validate {
            remote,
            remote_config,
        }) => {
            let config = RunConfig {
                data_dir: cli.data_dir,
                remote: remote.then_some(remote_config),
            };
            validate_command(&config).await?;
        }
        Some(Commands::Remote { remote_config }) => {
            remote_command(&cli.data_dir, &remote_config).await?;
        }
        Some(Commands::Checksum { address }) => {
            checksum_command(&address)?;
        }
        Some(Commands::Fix {
            registry,
            transform,
            curator,
            dry_run,
        }) => {
            fix_command(
                &cli.data_dir,
                registry,
                transform,
                curator.as_deref(),
                dry_run,
            )?;
        }
        Some(Commands::Migrate {
            legacy_dir,
            out_dir,
            dry_run,
        }) => {
            migrate_command(&legacy_dir, &out_dir, dry_run)?;
        }
        None => {
            // Default to an offline validation run
            let config = RunConfig {
                data_dir: cli.data_dir,
                remote: None,
            };
            validate_command(&config).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbose {
        0 => EnvFilter::new("reglint=warn"),
        1 => EnvFilter::new("reglint=info"),
        _ => EnvFilter::new("reglint=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
