use serde::{Deserialize, Serialize};

use crate::ledger::ReminderFrequency;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub company: Company,
    pub user: User,
    #[serde(default)]
    pub invoice: InvoiceSettings,
    #[serde(default)]
    pub collections: CollectionsSettings,
    #[serde(default)]
    pub webhooks: WebhookSettings,
}

/// The operating company, as the identity provider would return it.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Company {
    pub id: String,
    pub name: String,
}

/// The operator identity attached to every outbound webhook envelope.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "admin".to_string()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct InvoiceSettings {
    pub currency_symbol: String,
}

impl Default for InvoiceSettings {
    fn default() -> Self {
        Self {
            currency_symbol: "£".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CollectionsSettings {
    /// Cadence given to new invoices and to `activate` when the caller does
    /// not choose one.
    pub default_frequency: ReminderFrequency,
}

impl Default for CollectionsSettings {
    fn default() -> Self {
        Self {
            default_frequency: ReminderFrequency::Weekly,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WebhookSettings {
    /// Reminder notification endpoint. Empty means dispatch is skipped.
    #[serde(default)]
    pub reminder_url: String,
    /// Schedule-activation endpoint. Empty means dispatch is skipped.
    #[serde(default)]
    pub schedule_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    8
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            reminder_url: String::new(),
            schedule_url: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
