use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(Uuid);

impl CustomerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CustomerId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for CustomerId {
    type Err = crate::error::InfofixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| crate::error::InfofixError::CustomerNotFound(s.to_string()))
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A walk-in or returning customer of the shop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: CustomerId::new(),
            name: name.into(),
            phone: phone.into(),
            email: None,
            address: None,
            created_at: Utc::now(),
        }
    }

    /// Case-insensitive match on name, phone or email
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&query)
            || self.phone.contains(&query)
            || self
                .email
                .as_ref()
                .map(|e| e.to_lowercase().contains(&query))
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_matches_name_phone_email() {
        let mut customer = Customer::new("Kwame Mensah", "0244123456");
        customer.email = Some("Kwame@Example.com".to_string());

        assert!(customer.matches("kwame"));
        assert!(customer.matches("MENSAH"));
        assert!(customer.matches("0244"));
        assert!(customer.matches("example.com"));
        assert!(customer.matches("  "));
        assert!(!customer.matches("akosua"));
    }

    #[test]
    fn test_customer_id_parsing() {
        let id = CustomerId::new();
        let parsed = CustomerId::from_str(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
        assert!(CustomerId::from_str("not-a-uuid").is_err());
    }
}
