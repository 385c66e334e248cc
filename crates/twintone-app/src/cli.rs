//! CLI argument definitions for the TwinTone server.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use twintone_core::config::{ProviderKind, TwinToneConfig};

/// TwinTone - answers every question twice, once casually and once formally.
#[derive(Parser, Debug)]
#[command(name = "twintone", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Data directory holding the SQLite database.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Generation provider (openai, mock).
    #[arg(long = "provider")]
    pub provider: Option<ProviderKind>,

    /// Write the effective configuration to the config path and exit.
    #[arg(long = "init-config")]
    pub init_config: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > TWINTONE_CONFIG env var > ~/.twintone/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        self.config_path_from(std::env::var("TWINTONE_CONFIG").ok())
    }

    fn config_path_from(&self, env_path: Option<String>) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Some(p) = env_path {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Priority: --port flag > TWINTONE_PORT env var > config file value.
    fn port_from(&self, env_port: Option<String>, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        env_port
            .and_then(|val| val.parse::<u16>().ok())
            .unwrap_or(config_port)
    }

    /// Apply every command-line override to a loaded configuration.
    pub fn apply_overrides(&self, config: &mut TwinToneConfig) {
        self.apply_overrides_with(config, std::env::var("TWINTONE_PORT").ok());
    }

    fn apply_overrides_with(&self, config: &mut TwinToneConfig, env_port: Option<String>) {
        config.general.port = self.port_from(env_port, config.general.port);
        if let Some(ref dir) = self.data_dir {
            config.general.data_dir = dir.to_string_lossy().to_string();
        }
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(provider) = self.provider {
            config.generation.provider = provider;
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".twintone").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".twintone").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_flags() {
        let args = CliArgs::try_parse_from([
            "twintone",
            "-c",
            "/etc/twintone.toml",
            "-p",
            "9001",
            "-d",
            "/srv/data",
            "-l",
            "debug",
            "--provider",
            "mock",
        ])
        .unwrap();

        let env = Some("/from/env.toml".to_string());
        assert_eq!(args.config_path_from(env), PathBuf::from("/etc/twintone.toml"));
        assert_eq!(args.port_from(Some("7000".to_string()), 8000), 9001);
        assert_eq!(args.provider, Some(ProviderKind::Mock));
        assert!(!args.init_config);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        assert!(CliArgs::try_parse_from(["twintone", "--provider", "gemini"]).is_err());
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let args = CliArgs::try_parse_from([
            "twintone",
            "--port",
            "9100",
            "--data-dir",
            "/tmp/tt",
            "--log-level",
            "warn",
            "--provider",
            "mock",
        ])
        .unwrap();
        let mut config = TwinToneConfig::default();
        args.apply_overrides_with(&mut config, Some("7000".to_string()));

        assert_eq!(config.general.port, 9100);
        assert_eq!(config.general.data_dir, "/tmp/tt");
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.generation.provider, ProviderKind::Mock);
    }

    #[test]
    fn test_no_flags_keep_config_values() {
        let args = CliArgs::try_parse_from(["twintone"]).unwrap();
        let mut config = TwinToneConfig::default();
        config.general.data_dir = "/from/config".to_string();
        config.general.port = 8123;
        args.apply_overrides_with(&mut config, None);

        assert_eq!(config.general.port, 8123);
        assert_eq!(config.general.data_dir, "/from/config");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.generation.provider, ProviderKind::OpenAi);
    }

    #[test]
    fn test_env_sits_between_flags_and_config() {
        let args = CliArgs::try_parse_from(["twintone"]).unwrap();

        assert_eq!(args.port_from(Some("7000".to_string()), 8000), 7000);
        assert_eq!(args.port_from(Some("not-a-port".to_string()), 8000), 8000);
        assert_eq!(args.port_from(None, 8000), 8000);
        assert_eq!(
            args.config_path_from(Some("/from/env.toml".to_string())),
            PathBuf::from("/from/env.toml")
        );
    }

    #[test]
    fn test_init_config_flag() {
        let args = CliArgs::try_parse_from(["twintone", "--init-config"]).unwrap();
        assert!(args.init_config);
    }
}
