//! Command-line arguments and logging setup for the omc-api binary

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use omc_common::config::{LogFormat, SettingsOverrides};

#[derive(Parser, Debug, Default)]
#[command(name = "omc-api")]
#[command(about = "Track metadata compliance service")]
#[command(version)]
pub struct Args {
    /// Config file (default: ~/.config/omc/config.toml, then /etc/omc/config.toml)
    #[arg(short, long, env = "OMC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "OMC_PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "OMC_BIND")]
    pub bind: Option<String>,

    /// Rule data folder (artists/, overrides/, sources/, labels/)
    #[arg(short, long, env = "OMC_DATA_FOLDER")]
    pub data_folder: Option<PathBuf>,

    /// Shared secret required in the x-api-key header
    #[arg(long, env = "OMC_API_SECRET", hide_env_values = true)]
    pub api_secret: Option<String>,

    #[arg(long, env = "OSU_CLIENT_ID")]
    pub osu_client_id: Option<String>,

    #[arg(long, env = "OSU_CLIENT_SECRET", hide_env_values = true)]
    pub osu_client_secret: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log output format (text or json)
    #[arg(long, env = "LOG_FORMAT")]
    pub log_format: Option<String>,
}

impl Args {
    pub fn overrides(&self) -> omc_common::Result<SettingsOverrides> {
        let log_format = self
            .log_format
            .as_deref()
            .map(str::parse::<LogFormat>)
            .transpose()?;

        Ok(SettingsOverrides {
            bind: self.bind.clone(),
            port: self.port,
            data_folder: self.data_folder.clone(),
            api_secret: self.api_secret.clone(),
            osu_client_id: self.osu_client_id.clone(),
            osu_client_secret: self.osu_client_secret.clone(),
            log_level: self.log_level.clone(),
            log_format,
        })
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},tower_http={level}")));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}
