mod settings;

pub use settings::{
    CollectionsSettings, Company, Config, InvoiceSettings, User, WebhookSettings,
};

use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::{CashbuildError, Result};
use crate::ledger::Store;

/// Get the config directory path (~/.cashbuild or XDG config)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "cashbuild") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.cashbuild/
    let home = dirs_home().ok_or_else(|| {
        CashbuildError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".cashbuild"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Load the main config.toml
pub fn load_config(config_dir: &PathBuf) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(CashbuildError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| CashbuildError::ConfigParse { path, source: e })
}

/// Load store.toml (creates an empty store if missing)
pub fn load_store(config_dir: &PathBuf) -> Result<Store> {
    let path = config_dir.join("store.toml");
    if !path.exists() {
        return Ok(Store::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| CashbuildError::ConfigParse { path, source: e })
}

/// Save store.toml
pub fn save_store(config_dir: &PathBuf, store: &Store) -> Result<()> {
    let path = config_dir.join("store.toml");
    let content = toml::to_string_pretty(store).map_err(|e| {
        CashbuildError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    fs::write(path, content)?;
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[company]
id = "cmp_000001"
name = "Your Company Ltd"

[user]
id = "usr_000001"
name = "Site Manager"
email = "accounts@yourcompany.co.uk"
# phone = "07700 900000"   # optional
role = "admin"

[invoice]
currency_symbol = "£"

[collections]
default_frequency = "Weekly"   # Hourly | Daily | Weekly | Disabled

[webhooks]
# Outbound notification endpoints. Leave empty to skip dispatch.
reminder_url = ""
schedule_url = ""
timeout_secs = 8
"#;
