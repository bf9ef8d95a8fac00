use anyhow::{Context, Result};
use luxmap_schemas::{measurement::ZField, surface::InterpolationMethod};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "luxmap.yaml";

pub const DEFAULT_PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Presentation settings shared by every command. Every field has a default,
/// so an empty or partial YAML file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub z_field: ZField,
    pub interpolation: InterpolationMethod,
    pub output_dir: PathBuf,
    pub png_size: (u32, u32),
    pub server: ServerConfig,
    pub plotly_cdn: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            z_field: ZField::Ppfd,
            interpolation: InterpolationMethod::Cubic,
            output_dir: PathBuf::from("."),
            png_size: (1024, 768),
            server: ServerConfig::default(),
            plotly_cdn: DEFAULT_PLOTLY_CDN.to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:5000".to_string(),
        }
    }
}

impl AppConfig {
    /// Reads `explicit` when given; otherwise `luxmap.yaml` if it exists,
    /// falling back to the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::from_file(path)
                } else {
                    log::debug!("No {} found, using default settings", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse YAML from {:?}", path))?;
        log::info!("Loaded settings from {:?}", path);
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// `output_dir/<file_name>`
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(AppConfig::from_yaml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = AppConfig::from_yaml(
            "z_field: pfd\ninterpolation: nearest\npng_size: [800, 600]\nserver:\n  addr: 0.0.0.0:8080\n",
        )
        .unwrap();
        assert_eq!(config.z_field, ZField::Pfd);
        assert_eq!(config.interpolation, InterpolationMethod::Nearest);
        assert_eq!(config.png_size, (800, 600));
        assert_eq!(config.server.addr, "0.0.0.0:8080");
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.plotly_cdn, DEFAULT_PLOTLY_CDN);
    }

    #[test]
    fn unknown_method_is_rejected() {
        assert!(AppConfig::from_yaml("interpolation: spline\n").is_err());
    }

    #[test]
    fn explicit_file_must_exist() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(AppConfig::load(Some(&missing)).is_err());

        let path = dir.path().join("luxmap.yaml");
        fs::write(&path, "output_dir: plots\n").unwrap();
        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.output_path("a.html"), PathBuf::from("plots").join("a.html"));
    }
}
