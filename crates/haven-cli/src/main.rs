use anyhow::Result;
use clap::{Parser, Subcommand};
use haven_infrastructure::ConfigService;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::account::AccountCommand;
use commands::config::ConfigAction;
use commands::emergency::EmergencyAction;
use commands::validate::ValidateAction;

#[derive(Parser)]
#[command(name = "haven")]
#[command(about = "Haven CLI - account, profile and emergency calling", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check form input against the validation rules
    Validate {
        #[command(subcommand)]
        action: ValidateAction,
    },
    /// Rate a password
    Strength { password: String },
    /// List accepted Malaysian states and federal territories
    States,
    #[command(flatten)]
    Account(AccountCommand),
    /// Helplines, personal contacts and call history
    Emergency {
        #[command(subcommand)]
        action: EmergencyAction,
    },
    /// Show or initialize config.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

fn init_tracing(default_level: &str, verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { default_level };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_service = ConfigService::new();
    init_tracing(&config_service.get_config().logging.level, cli.verbose);

    match cli.command {
        Commands::Validate { action } => commands::validate::run(action)?,
        Commands::Strength { password } => commands::validate::strength(&password),
        Commands::States => commands::validate::states(),
        Commands::Account(command) => commands::account::run(command, &config_service).await?,
        Commands::Emergency { action } => {
            commands::emergency::run(action, &config_service).await?
        }
        Commands::Config { action } => commands::config::run(action, &config_service)?,
    }

    Ok(())
}
