use clap::Subcommand;

use tomatui_core::storage::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file path
    Path,
    /// Write a default config file if none exists
    Init,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load_or_default();
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", Config::default_path()?.display());
        }
        ConfigAction::Init => {
            let path = Config::default_path()?;
            if path.exists() {
                eprintln!("config already exists: {}", path.display());
                std::process::exit(1);
            }
            Config::default().save(&path)?;
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}
