use crate::{
    domain::ticket::{Priority, TicketId},
    error::{InfofixError, Result},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path};

/// Days allowed for a priority the SLA table does not list
pub const DEFAULT_ALLOWED_DAYS: u32 = 7;

/// Allowed days until an active ticket is overdue, keyed by lowercase priority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlaConfig(BTreeMap<String, u32>);

impl SlaConfig {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, priority: impl AsRef<str>, days: u32) -> Self {
        self.set(priority, days);
        self
    }

    pub fn set(&mut self, priority: impl AsRef<str>, days: u32) {
        self.0.insert(priority.as_ref().trim().to_lowercase(), days);
    }

    /// Configured allowance, if the priority is listed
    pub fn get(&self, priority: &Priority) -> Option<u32> {
        self.0.get(&priority.sla_key()).copied()
    }

    /// Allowance for a priority, falling back to [`DEFAULT_ALLOWED_DAYS`]
    pub fn allowed_days(&self, priority: &Priority) -> u32 {
        self.get(priority).unwrap_or(DEFAULT_ALLOWED_DAYS)
    }
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self::empty().with("high", 1).with("medium", 3).with("low", 5)
    }
}

/// Tenant-level settings managed by administrators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopSettings {
    pub name: String,
    pub stores: Vec<String>,
    /// Extra status names beyond the built-in workflow
    pub custom_statuses: Vec<String>,
    pub priorities: Vec<String>,
    pub hold_reasons: Vec<String>,
    pub device_types: Vec<String>,
    pub sla: SlaConfig,
}

impl Default for ShopSettings {
    fn default() -> Self {
        Self {
            name: "INFOFIX Services".to_string(),
            stores: vec!["Main Store".to_string()],
            custom_statuses: Vec::new(),
            priorities: vec!["High".to_string(), "Medium".to_string(), "Low".to_string()],
            hold_reasons: vec![
                "Awaiting Parts".to_string(),
                "Awaiting Customer Approval".to_string(),
                "Awaiting Payment".to_string(),
            ],
            device_types: vec![
                "Laptop".to_string(),
                "Desktop".to_string(),
                "Phone".to_string(),
                "Tablet".to_string(),
                "Printer".to_string(),
            ],
            sla: SlaConfig::default(),
        }
    }
}

impl ShopSettings {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| InfofixError::ConfigError(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| InfofixError::ConfigError(e.to_string()))
    }

    /// Reads settings from a TOML file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_toml_str(&contents)
    }

    pub fn has_store(&self, store: &str) -> bool {
        self.resolve_store(store).is_some()
    }

    /// The configured spelling of `store`, matched case-insensitively
    pub fn resolve_store(&self, store: &str) -> Option<&str> {
        let store = store.trim();
        self.stores
            .iter()
            .find(|s| s.eq_ignore_ascii_case(store))
            .map(String::as_str)
    }
}

/// Persisted shop state: settings plus the ticket counter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shop {
    pub settings: ShopSettings,
    pub next_ticket_number: u32,
}

impl Shop {
    pub fn new(settings: ShopSettings) -> Self {
        Self {
            settings,
            next_ticket_number: 1,
        }
    }

    /// Generates the next ticket ID
    pub fn next_ticket_id(&mut self) -> TicketId {
        let id = TicketId::new(self.next_ticket_number);
        self.next_ticket_number += 1;
        id
    }
}

impl Default for Shop {
    fn default() -> Self {
        Self::new(ShopSettings::default())
    }
}
