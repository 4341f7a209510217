use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_APOD_BASE_URL: &str = "https://api.nasa.gov/planetary/apod?api_key=";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dashboard: DashboardConfig,
    pub apod: ApodConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub title: String,
    pub header: String,
    pub subheader: String,
    pub overview: String,
    pub dataset: PathBuf,
    pub delimiter: char,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "Water Quality Dashboard".to_string(),
            header: "Internship-Ready Software Development".to_string(),
            subheader: "Susana Rojas".to_string(),
            overview: "This app explores Biscayne Bay water quality data using interactive \
                       visualizations. Use the tabs below to examine the dataset, trends, \
                       and a live NASA API integration."
                .to_string(),
            dataset: PathBuf::from("biscayneBay_waterquality.csv"),
            delimiter: ',',
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApodConfig {
    pub base_url: String,
    pub secrets_file: Option<PathBuf>,
    /// Width of the rendered picture in terminal cells.
    pub image_width: u32,
}

impl Default for ApodConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_APOD_BASE_URL.to_string(),
            secrets_file: None,
            image_width: 48,
        }
    }
}

impl ApodConfig {
    pub fn secrets_path(&self) -> Option<PathBuf> {
        self.secrets_file
            .clone()
            .or_else(|| config_dir().map(|dir| dir.join("secrets.toml")))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn log_path(&self) -> PathBuf {
        self.file.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("wqdash")
                .join("wqdash.log")
        })
    }
}

fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wqdash"))
}

pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

impl Config {
    /// Loads the config from `path`, or from the default location when no path
    /// is given. A missing default file yields the defaults; an explicit path
    /// must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
