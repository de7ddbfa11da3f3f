use std::path::PathBuf;

use anyhow::{Context, Result};

pub struct Config {
    pub releases_path: PathBuf,
    pub include_undesired: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            releases_path: std::env::var("RELEASES_PATH")
                .context("RELEASES_PATH")?
                .into(),
            include_undesired: std::env::var("INCLUDE_UNDESIRED")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
