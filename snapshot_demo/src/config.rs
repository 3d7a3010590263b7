use std::path::Path;

use persistence::Format;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersistSection {
    pub save_dir: String,
    pub format: Format,
    pub label: String,
}

impl Default for PersistSection {
    fn default() -> Self {
        Self {
            save_dir: "data/snapshots".to_string(),
            format: Format::Binary,
            label: "demo".to_string(),
        }
    }
}

/// Top-level demo configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub persistence: PersistSection,
}

impl DemoConfig {
    /// Load configuration from an optional TOML file path.
    pub fn load(config_path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let config = match config_path {
            Some(path) if Path::new(path).exists() => {
                let content = std::fs::read_to_string(path)?;
                toml::from_str(&content)?
            }
            _ => Self::default(),
        };
        Ok(config)
    }
}

/// Parsed command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    pub config_path: Option<String>,
    pub format: Option<Format>,
}

/// Supports: --config <path>, --format <binary|compact|json>
pub fn parse_args<I>(args: I) -> Result<CliArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let val = args.next().ok_or("--config requires a path argument")?;
                parsed.config_path = Some(val);
            }
            "--format" => {
                let val = args.next().ok_or("--format requires a value")?;
                parsed.format = Some(val.parse()?);
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }
    Ok(parsed)
}

/// Parse CLI arguments and load config.
pub fn parse_cli_args() -> DemoConfig {
    let cli = match parse_args(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let mut config = match DemoConfig::load(cli.config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(format) = cli.format {
        config.persistence.format = format;
    }
    config
}
