use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::calendar::DEFAULT_BLOCK_COLOR;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_block_color")]
    pub block_color: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            block_color: default_block_color(),
        }
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_block_color() -> String {
    DEFAULT_BLOCK_COLOR.to_string()
}

/// Backend collections that get a list screen and a dashboard counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Resource {
    Hotels,
    Rooms,
    Clients,
    Employees,
    Reservations,
    Cleanings,
    Invoices,
    Payments,
}

impl Resource {
    pub const ALL: [Resource; 8] = [
        Resource::Hotels,
        Resource::Rooms,
        Resource::Clients,
        Resource::Employees,
        Resource::Reservations,
        Resource::Cleanings,
        Resource::Invoices,
        Resource::Payments,
    ];

    /// Path segment under the API base URL, also used in dashboard links.
    pub fn path(self) -> &'static str {
        match self {
            Resource::Hotels => "hotels",
            Resource::Rooms => "rooms",
            Resource::Clients => "clients",
            Resource::Employees => "employees",
            Resource::Reservations => "reservations",
            Resource::Cleanings => "cleanings",
            Resource::Invoices => "invoices",
            Resource::Payments => "payments",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Resource::Hotels => "Hotels",
            Resource::Rooms => "Rooms",
            Resource::Clients => "Clients",
            Resource::Employees => "Employees",
            Resource::Reservations => "Reservations",
            Resource::Cleanings => "Cleanings",
            Resource::Invoices => "Invoices",
            Resource::Payments => "Payments",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.path() == path)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Claims read from the backend's JWT after login.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct TokenClaims {
    #[serde(default, alias = "username")]
    pub sub: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_paths_round_trip() {
        for r in Resource::ALL {
            assert_eq!(Resource::from_path(r.path()), Some(r));
        }
        assert_eq!(Resource::from_path("guests"), None);
    }

    #[test]
    fn test_resource_value_enum_names() {
        assert_eq!(
            Resource::from_str("cleanings", true).ok(),
            Some(Resource::Cleanings)
        );
    }
}
