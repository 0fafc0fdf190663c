//! Connection and limit settings read from a TOML file

use std::path::{Path, PathBuf};

use anyhow::Context;
use rscp_protocol::commands::{Credentials, PowerBounds};
use rscp_protocol::types::{Watt, WattHours};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Address of the storage system
    pub server_ip: String,
    #[serde(default = "default_port")]
    pub server_port: u16,
    /// Portal login
    pub user: String,
    pub password: String,
    /// RSCP password set on the device, keys the transport encryption
    pub aes_password: String,
    /// Upper bound for charge and discharge limits in W
    #[serde(default = "default_max_power")]
    pub max_power: u32,
    /// Manual charge bounds in Wh
    #[serde(default = "default_min_charge_energy")]
    pub min_charge_energy: u32,
    #[serde(default = "default_max_charge_energy")]
    pub max_charge_energy: u32,
    #[serde(default)]
    pub debug: bool,
    /// Receive timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Consecutive timeouts before giving up
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Optional tag dictionary file
    pub dictionary: Option<PathBuf>,
}

fn default_port() -> u16 {
    rscp_protocol::DEFAULT_PORT
}
fn default_max_power() -> u32 {
    3000
}
fn default_min_charge_energy() -> u32 {
    100
}
fn default_max_charge_energy() -> u32 {
    8000
}
fn default_timeout_ms() -> u64 {
    3000
}
fn default_retries() -> u32 {
    3
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.user, &self.password)
    }

    pub fn bounds(&self) -> PowerBounds {
        PowerBounds {
            max_power: Watt(self.max_power),
            min_charge_energy: WattHours(self.min_charge_energy),
            max_charge_energy: WattHours(self.max_charge_energy),
        }
    }
}
