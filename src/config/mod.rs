mod clinic;

pub use clinic::{BillingSettings, Clinic, Config, StorageSettings, DEFAULT_PAYMENT_MODES};

use crate::error::{BillingError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "clinic.toml";
pub const RECORDS_FILE: &str = "records.json";

/// Get the config directory path (XDG config dir, or ~/.clinic/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "clinic") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        BillingError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".clinic"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Path of the record store inside a config directory
pub fn records_path(config_dir: &Path) -> PathBuf {
    config_dir.join(RECORDS_FILE)
}

/// Load clinic.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    let path = config_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Err(BillingError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| BillingError::ConfigParse { path, source: e })
}

/// Template content for clinic.toml
pub const CONFIG_TEMPLATE: &str = r#"[clinic]
name = "Sync Clinic"
# trading_name = "Sync Clinic Westlands"   # optional
# phone = "+254 700 000 000"               # optional
# email = "billing@syncclinic.example"     # optional
# footer_notes = "Get well soon!"          # optional, printed on receipts

[billing]
currency = "KES"
user = "Admin"        # recorded on audit and billing history entries
# Extra payment modes on top of M-Pesa, Cash and Bank
payment_modes = []    # e.g., ["Insurance", "Card"]

[storage]
# quota_bytes = 5242880   # optional, refuse writes beyond this size
"#;
