//! Command-line interface for the guildhall server.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Guildhall - gaming community API server
#[derive(Parser)]
#[command(name = "guildhall")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the default search path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy, Default, PartialEq, Eq, Debug)]
pub enum Commands {
    /// Run the HTTP API (default)
    #[default]
    Serve,

    /// Create a default config file
    Init,

    /// Validate the configuration and exit
    CheckConfig,

    /// Apply database migrations and exit
    Migrate,
}

impl Cli {
    /// Loads the file given with `--config`, or searches the default locations.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) => {
                let mut config = Config::load_from_path(path)?;
                config.apply_env_overrides()?;
                Ok(config)
            }
            None => Config::load(),
        }
    }
}

pub fn init_config(path: Option<&Path>) -> anyhow::Result<()> {
    let path = path.map_or_else(Config::default_config_path, Path::to_path_buf);

    if Config::create_default_if_missing(&path)? {
        println!("Created {}", path.display());
    } else {
        println!("{} already exists, leaving it untouched", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli::try_parse_from(["guildhall"]).unwrap();
        assert_eq!(cli.command.unwrap_or_default(), Commands::Serve);
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["guildhall", "check-config", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.command, Some(Commands::CheckConfig));
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));

        let cli = Cli::try_parse_from(["guildhall", "migrate"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Migrate));
    }
}
