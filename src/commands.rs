use std::path::Path;

use anyhow::Result;
use chrono::DateTime;
use tracing::{info, warn};

use crate::calendar;
use crate::client::HotelApiClient;
use crate::config;
use crate::models::{ApiConfig, Resource};
use crate::projection;

/// Resolve login/password from CLI flags or the `[api]` section.
pub fn resolve_credentials<'a>(
    user_flag: &'a Option<String>,
    pass_flag: &'a Option<String>,
    api: &'a ApiConfig,
) -> Result<(&'a str, &'a str)> {
    let login = user_flag
        .as_deref()
        .or(api.username.as_deref())
        .ok_or_else(|| anyhow::anyhow!("No username in config and no --user provided"))?;
    let pass = pass_flag
        .as_deref()
        .or(api.password.as_deref())
        .ok_or_else(|| anyhow::anyhow!("No password in config and no --password provided"))?;
    Ok((login, pass))
}

pub async fn run_projection(config_path: &Path) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    let api = HotelApiClient::connect(&cfg.api).await?;

    let history = api.reservations_per_month().await?;
    if history.is_empty() {
        println!("No reservation history available.");
        return Ok(());
    }

    println!("Reservations per month:\n");
    for m in &history {
        println!("  {}  {:>6}", m.month, m.count);
    }

    match projection::project_next_month(&history) {
        Some(p) => println!("  {}  {:>6}  (projected)", p.month, p.count),
        None => info!("No projection available"),
    }
    Ok(())
}

pub async fn run_calendar(config_path: &Path, room: &str) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    let api = HotelApiClient::connect(&cfg.api).await?;

    let intervals = api.occupied_dates(room).await?;
    let blocks = calendar::to_calendar_blocks(&intervals, &cfg.display.block_color)?;

    if blocks.is_empty() {
        println!("Room {} has no occupied dates.", room);
        return Ok(());
    }

    println!("Occupied dates for room {}:\n", room);
    for (interval, block) in intervals.iter().zip(&blocks) {
        print!(
            "  [{}] {} to {} (block {} .. {})",
            block.id, interval.start, interval.end, block.start, block.end
        );
        if interval.is_inverted() {
            print!("  <- ends before it starts");
        }
        println!();
    }
    Ok(())
}

pub async fn run_list(config_path: &Path, resource: Resource, verbose: bool) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    let api = HotelApiClient::connect(&cfg.api).await?;

    let rows = api.list(resource).await?;
    if rows.is_empty() {
        println!("No {} found.", resource);
        return Ok(());
    }

    println!("{} ({}):\n", resource.title(), rows.len());
    for row in &rows {
        if verbose {
            println!("{}", serde_json::to_string_pretty(row)?);
        } else {
            println!("  {}", row);
        }
    }
    Ok(())
}

pub async fn run_login(base_url: &str, username: &str, password: &str, verbose: bool) -> Result<()> {
    let mut api = HotelApiClient::new(base_url)?;

    println!("Logging in as {}...", username);
    let resp = api.login(username, password).await?;

    match api.claims() {
        Some(claims) => {
            println!("\n=== Session ===");
            println!("  user: {}", claims.sub.as_deref().unwrap_or("?"));
            println!("  role: {}", claims.role.as_deref().unwrap_or("?"));
            if let Some(exp) = claims.exp {
                match DateTime::from_timestamp(exp, 0) {
                    Some(t) => println!("  expires: {}", t.format("%Y-%m-%d %H:%M:%S UTC")),
                    None => warn!("Token expiry {} is out of range", exp),
                }
            }
        }
        None => println!("Logged in (token is not a readable JWT)."),
    }

    if verbose {
        println!("\n{}", serde_json::to_string_pretty(&resp)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(user: Option<&str>, pass: Option<&str>) -> ApiConfig {
        ApiConfig {
            base_url: "http://localhost".into(),
            username: user.map(String::from),
            password: pass.map(String::from),
        }
    }

    #[test]
    fn test_credentials_from_config() {
        let cfg = api(Some("admin"), Some("secret"));
        let (u, p) = resolve_credentials(&None, &None, &cfg).unwrap();
        assert_eq!((u, p), ("admin", "secret"));
    }

    #[test]
    fn test_flags_override_config() {
        let cfg = api(Some("admin"), Some("secret"));
        let user = Some("frontdesk".to_string());
        let (u, p) = resolve_credentials(&user, &None, &cfg).unwrap();
        assert_eq!((u, p), ("frontdesk", "secret"));
    }

    #[test]
    fn test_missing_password() {
        let cfg = api(Some("admin"), None);
        assert!(resolve_credentials(&None, &None, &cfg).is_err());
    }
}
