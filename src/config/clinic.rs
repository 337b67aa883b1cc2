use serde::{Deserialize, Serialize};

/// Payment modes every clinic accepts, before any configured extras.
pub const DEFAULT_PAYMENT_MODES: [&str; 3] = ["M-Pesa", "Cash", "Bank"];

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub clinic: Clinic,
    #[serde(default)]
    pub billing: BillingSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Clinic {
    pub name: String,
    #[serde(default)]
    pub trading_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub footer_notes: Option<String>,
}

impl Default for Clinic {
    fn default() -> Self {
        Self {
            name: "Sync Clinic".to_string(),
            trading_name: None,
            phone: None,
            email: None,
            footer_notes: None,
        }
    }
}

impl Clinic {
    /// Receipt footer: configured notes, or a thank-you line naming the clinic.
    pub fn footer(&self) -> String {
        match self.footer_notes.as_deref() {
            Some(notes) if !notes.trim().is_empty() => notes.to_string(),
            _ => format!("Thank you for choosing {}", self.name),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct BillingSettings {
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Name recorded on audit and billing history entries
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default)]
    pub payment_modes: Vec<String>,
}

impl Default for BillingSettings {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            user: default_user(),
            payment_modes: Vec::new(),
        }
    }
}

impl BillingSettings {
    /// Defaults first, then configured modes in file order. A mode that differs
    /// from an earlier one only by case is dropped.
    pub fn all_payment_modes(&self) -> Vec<String> {
        let mut modes: Vec<String> = DEFAULT_PAYMENT_MODES.iter().map(|m| m.to_string()).collect();
        for mode in &self.payment_modes {
            let mode = mode.trim();
            if !mode.is_empty() && !modes.iter().any(|m| m.eq_ignore_ascii_case(mode)) {
                modes.push(mode.to_string());
            }
        }
        modes
    }
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct StorageSettings {
    /// Upper bound on the size of the record store file
    #[serde(default)]
    pub quota_bytes: Option<u64>,
}

fn default_currency() -> String {
    "KES".to_string()
}

fn default_user() -> String {
    "Admin".to_string()
}
