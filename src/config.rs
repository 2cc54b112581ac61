use std::path::Path;

use anyhow::{Context, Result};
use chrono_tz::Tz;

use crate::models::Config;

pub fn load_config(path: &Path) -> Result<Config> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    // fail at startup rather than on first render
    timezone(&config)?;
    Ok(config)
}

pub fn timezone(config: &Config) -> Result<Tz> {
    let name = config.display.timezone.trim();
    name.parse::<Tz>()
        .map_err(|e| anyhow::anyhow!("Unknown timezone '{}' in [display]: {}", name, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::DEFAULT_BLOCK_COLOR;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [api]
            base_url = "http://localhost:8080/api"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.api.base_url, "http://localhost:8080/api");
        assert!(cfg.api.username.is_none());
        assert_eq!(cfg.display.timezone, "UTC");
        assert_eq!(cfg.display.block_color, DEFAULT_BLOCK_COLOR);
        assert_eq!(timezone(&cfg).unwrap(), Tz::UTC);
    }

    #[test]
    fn test_full_config() {
        let cfg: Config = toml::from_str(
            r##"
            [api]
            base_url = "https://hotel.example/api"
            username = "admin"
            password = "secret"

            [display]
            timezone = "Europe/Madrid"
            block_color = "#336699"
            "##,
        )
        .unwrap();
        assert_eq!(cfg.api.username.as_deref(), Some("admin"));
        assert_eq!(cfg.display.block_color, "#336699");
        assert_eq!(timezone(&cfg).unwrap(), Tz::Europe__Madrid);
    }

    #[test]
    fn test_unknown_timezone() {
        let cfg: Config = toml::from_str(
            r#"
            [api]
            base_url = "http://localhost"
            [display]
            timezone = "Mars/Olympus"
            "#,
        )
        .unwrap();
        assert!(timezone(&cfg).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/nonexistent/hotel-dashboard.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read"));
    }
}
