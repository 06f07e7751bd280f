use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MachineStatus {
    Active,
    Maintenance,
    Retired,
}

impl Display for MachineStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MachineStatus::Active => write!(f, "active"),
            MachineStatus::Maintenance => write!(f, "maintenance"),
            MachineStatus::Retired => write!(f, "retired"),
        }
    }
}

impl FromStr for MachineStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MachineStatus::Active),
            "maintenance" => Ok(MachineStatus::Maintenance),
            "retired" => Ok(MachineStatus::Retired),
            _ => Err(anyhow::anyhow!("Invalid machine status: {}", s)),
        }
    }
}

/// A physical equipment record scoped to exactly one customer.
///
/// The `model` string is the matching key for content auto-assignment.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Machine {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub model: String,
    pub machine_type: Option<String>,
    pub location: Option<String>,
    pub status: MachineStatus,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for a new machine record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMachine {
    pub customer_id: Uuid,
    pub model: String,
    pub machine_type: Option<String>,
    pub location: Option<String>,
    pub status: MachineStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine_status_round_trip() {
        for status in [
            MachineStatus::Active,
            MachineStatus::Maintenance,
            MachineStatus::Retired,
        ] {
            assert_eq!(status.to_string().parse::<MachineStatus>().unwrap(), status);
        }
        assert!("scrapped".parse::<MachineStatus>().is_err());
    }
}
