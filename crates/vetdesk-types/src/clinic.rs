//! Clinic and user identity types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::SubscriptionStatus;

/// Unique clinic identifier. A clinic is the tenant boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClinicId(pub Uuid);

impl ClinicId {
    /// Create a new random clinic ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a clinic ID from a string
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for ClinicId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClinicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ClinicId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Unique user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Create a new random user ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from a string
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for UserId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Clinic record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clinic {
    /// Clinic ID
    pub id: ClinicId,
    /// Display name
    pub name: String,
    /// Subscription status
    pub subscription_status: SubscriptionStatus,
    /// End of the trial period, if one was granted
    pub trial_end_date: Option<DateTime<Utc>>,
    /// When the clinic was created
    pub created_at: DateTime<Utc>,
}
