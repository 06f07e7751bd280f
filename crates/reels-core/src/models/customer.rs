use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    Active,
    Trial,
    Suspended,
    Cancelled,
}

impl Display for CustomerStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CustomerStatus::Active => write!(f, "active"),
            CustomerStatus::Trial => write!(f, "trial"),
            CustomerStatus::Suspended => write!(f, "suspended"),
            CustomerStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for CustomerStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(CustomerStatus::Active),
            "trial" => Ok(CustomerStatus::Trial),
            "suspended" => Ok(CustomerStatus::Suspended),
            "cancelled" => Ok(CustomerStatus::Cancelled),
            _ => Err(anyhow::anyhow!("Invalid customer status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Basic,
    Standard,
    Premium,
}

impl Display for SubscriptionTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SubscriptionTier::Basic => write!(f, "basic"),
            SubscriptionTier::Standard => write!(f, "standard"),
            SubscriptionTier::Premium => write!(f, "premium"),
        }
    }
}

impl FromStr for SubscriptionTier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(SubscriptionTier::Basic),
            "standard" => Ok(SubscriptionTier::Standard),
            "premium" => Ok(SubscriptionTier::Premium),
            _ => Err(anyhow::anyhow!("Invalid subscription tier: {}", s)),
        }
    }
}

/// An organization/tenant that content can be scoped to.
///
/// Customers are never hard-deleted while library entries reference them;
/// deactivation is a status change.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub contact_email: Option<String>,
    pub subscription_tier: SubscriptionTier,
    pub status: CustomerStatus,
    pub max_seats: i32,
    pub max_storage_gb: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Whether the customer can currently be granted content access.
    pub fn is_active(&self) -> bool {
        matches!(self.status, CustomerStatus::Active | CustomerStatus::Trial)
    }
}

/// Insert shape for a new customer record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub contact_email: Option<String>,
    pub subscription_tier: SubscriptionTier,
    pub status: CustomerStatus,
    pub max_seats: i32,
    pub max_storage_gb: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_customer(status: CustomerStatus) -> Customer {
        Customer {
            id: Uuid::new_v4(),
            name: "Acme Corp".to_string(),
            contact_email: Some("ops@acme.example".to_string()),
            subscription_tier: SubscriptionTier::Standard,
            status,
            max_seats: 25,
            max_storage_gb: 100,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_customer_status_display_round_trip() {
        for status in [
            CustomerStatus::Active,
            CustomerStatus::Trial,
            CustomerStatus::Suspended,
            CustomerStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<CustomerStatus>().unwrap(), status);
        }
        assert!("deleted".parse::<CustomerStatus>().is_err());
    }

    #[test]
    fn test_subscription_tier_from_str() {
        assert_eq!(
            "premium".parse::<SubscriptionTier>().unwrap(),
            SubscriptionTier::Premium
        );
        assert!("platinum".parse::<SubscriptionTier>().is_err());
    }

    #[test]
    fn test_is_active_includes_trial() {
        assert!(test_customer(CustomerStatus::Active).is_active());
        assert!(test_customer(CustomerStatus::Trial).is_active());
        assert!(!test_customer(CustomerStatus::Suspended).is_active());
        assert!(!test_customer(CustomerStatus::Cancelled).is_active());
    }
}
