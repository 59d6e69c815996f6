use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::{LeafAreaError, Result};

/// Configuration for the leaf area service
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// HSV saturation (0-255) below which an in-leaf pixel counts as variegated
    #[serde(default = "default_saturation_threshold")]
    pub saturation_threshold: u8,

    /// Side length of the square structuring element used for mask cleanup.
    /// Must be odd so the kernel has a center pixel.
    #[serde(default = "default_closing_kernel_size")]
    pub closing_kernel_size: u32,

    #[serde(default = "default_closing_iterations")]
    pub closing_iterations: u32,

    /// Upper bound on the request body, uploaded image included
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_saturation_threshold() -> u8 {
    50
}

fn default_closing_kernel_size() -> u32 {
    5
}

fn default_closing_iterations() -> u32 {
    2
}

fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            saturation_threshold: default_saturation_threshold(),
            closing_kernel_size: default_closing_kernel_size(),
            closing_iterations: default_closing_iterations(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LeafAreaError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| LeafAreaError::ConfigLoad {
            source: e,
            path: path.to_path_buf(),
        })?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.closing_kernel_size == 0 {
            return Err(LeafAreaError::Config(
                "closing_kernel_size must be > 0".to_string(),
            ));
        }

        if self.closing_kernel_size % 2 == 0 {
            return Err(LeafAreaError::Config(
                "closing_kernel_size must be odd".to_string(),
            ));
        }

        if self.closing_iterations == 0 {
            return Err(LeafAreaError::Config(
                "closing_iterations must be > 0".to_string(),
            ));
        }

        if self.max_upload_bytes == 0 {
            return Err(LeafAreaError::Config(
                "max_upload_bytes must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}
