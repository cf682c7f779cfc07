use anyhow::{Result, bail};
use clap::Subcommand;
use haven_core::config::RootConfig;
use haven_infrastructure::ConfigService;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (anon key masked)
    Show,
    /// Print the config file location
    Path,
    /// Write config.toml with the given backend settings
    Init {
        #[arg(long)]
        url: String,
        #[arg(long)]
        anon_key: String,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(action: ConfigAction, config_service: &ConfigService) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let mut config = config_service.get_config();
            if !config.backend.anon_key.is_empty() {
                config.backend.anon_key = "********".to_string();
            }
            println!("{}", toml_string(&config)?);
        }
        ConfigAction::Path => match config_service.path() {
            Some(path) => println!("{}", path.display()),
            None => bail!("No config directory on this platform"),
        },
        ConfigAction::Init {
            url,
            anon_key,
            force,
        } => {
            if let Some(path) = config_service.path() {
                if path.exists() && !force {
                    bail!("{} already exists (use --force)", path.display());
                }
            }
            let mut config = config_service.load().unwrap_or_default();
            config.backend.url = url;
            config.backend.anon_key = anon_key;
            config_service.save(&config)?;
            println!("Wrote config");
        }
    }
    Ok(())
}

fn toml_string(config: &RootConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}
