use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use inquire::{Password, Select, Text};
use weather_core::{Config, WeatherService};

use crate::routes;

const UNITS: &[&str] = &["metric", "imperial", "standard"];

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Weather info HTTP server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub serve: ServeArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve,

    /// Interactively write the config file.
    Configure,

    /// Print where the config file lives.
    ConfigPath,
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to bind, overrides HOST.
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Port to listen on, overrides PORT.
    #[arg(long, global = true)]
    pub port: Option<u16>,
}

impl ServeArgs {
    fn apply(self, mut config: Config) -> Config {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        config
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            None | Some(Command::Serve) => serve(self.serve).await,
            Some(Command::Configure) => configure(),
            Some(Command::ConfigPath) => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = args.apply(Config::load()?);
    let service = WeatherService::from_config(&config)?;

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;

    tracing::info!(
        address = %listener.local_addr()?,
        upstream = %config.base_url,
        units = %config.default_unit,
        lang = %config.default_lang,
        "weather server started"
    );

    axum::serve(listener, routes::router(routes::AppState::new(service))).await?;
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let path = Config::config_file_path()?;
    let mut config = Config::load_from(&path)?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.api_key = Some(api_key.trim().to_string());
    }

    config.base_url = Text::new("Upstream base URL:")
        .with_default(&config.base_url)
        .prompt()?;
    config.icon_base_url = Text::new("Icon base URL:")
        .with_default(&config.icon_base_url)
        .prompt()?;

    let current = UNITS.iter().position(|u| *u == config.default_unit).unwrap_or(0);
    config.default_unit = Select::new("Default units:", UNITS.to_vec())
        .with_starting_cursor(current)
        .prompt()?
        .to_string();

    config.default_lang = Text::new("Default language:")
        .with_default(&config.default_lang)
        .prompt()?;

    let saved = config.save()?;
    println!("Configuration saved to {}", saved.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["weather-server", "--port", "8080"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.serve.port, Some(8080));
    }

    #[test]
    fn serve_flags_override_config() {
        let cli = Cli::try_parse_from(["weather-server", "serve", "--host", "0.0.0.0"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Serve)));

        let config = cli.serve.apply(Config::default());
        assert_eq!(config.bind_address(), "0.0.0.0:4500");
    }

    #[test]
    fn rejects_non_numeric_port() {
        assert!(Cli::try_parse_from(["weather-server", "--port", "http"]).is_err());
    }
}
