//! Subscription and trial types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Clinic subscription status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    /// Unpaid access for a limited period
    Trial,
    /// Paid subscription in good standing
    Active,
    /// Access paused (e.g. failed payment)
    Suspended,
    /// Subscription ended
    Cancelled,
}

impl SubscriptionStatus {
    /// Storage representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = SubscriptionStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trial" | "trialing" => Ok(Self::Trial),
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(SubscriptionStatusParseError(s.to_string())),
        }
    }
}

/// Error parsing a subscription status string
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid subscription status: {0}")]
pub struct SubscriptionStatusParseError(pub String);

/// Subscription state of one clinic, as needed for access decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialWindow {
    /// Current subscription status
    pub subscription_status: SubscriptionStatus,
    /// End of the trial period
    pub trial_end_date: Option<DateTime<Utc>>,
}

impl TrialWindow {
    /// Window for a clinic currently on trial
    pub fn trial(trial_end_date: Option<DateTime<Utc>>) -> Self {
        Self {
            subscription_status: SubscriptionStatus::Trial,
            trial_end_date,
        }
    }

    /// Window for a clinic outside of trial
    pub fn with_status(subscription_status: SubscriptionStatus) -> Self {
        Self {
            subscription_status,
            trial_end_date: None,
        }
    }
}

/// Result of evaluating a [`TrialWindow`] at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialStatus {
    /// Clinic is on a trial subscription
    pub is_in_trial: bool,
    /// Trial has run out (or has no end date)
    pub is_expired: bool,
    /// Whole days remaining, rounded up, never negative
    pub days_left: u32,
    /// Clinic may use the application
    pub can_access: bool,
    /// UI should warn that the trial ends soon
    pub should_show_notification: bool,
}

impl TrialStatus {
    /// Status for any clinic that is not on trial
    pub const fn not_in_trial() -> Self {
        Self {
            is_in_trial: false,
            is_expired: false,
            days_left: 0,
            can_access: true,
            should_show_notification: false,
        }
    }

    /// Status for a trial without an end date. Fails closed.
    pub const fn missing_end_date() -> Self {
        Self {
            is_in_trial: true,
            is_expired: true,
            days_left: 0,
            can_access: false,
            should_show_notification: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            SubscriptionStatus::Trial,
            SubscriptionStatus::Active,
            SubscriptionStatus::Suspended,
            SubscriptionStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<SubscriptionStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_accepts_us_spelling() {
        assert_eq!(
            "canceled".parse::<SubscriptionStatus>().unwrap(),
            SubscriptionStatus::Cancelled
        );
        assert!("paused".parse::<SubscriptionStatus>().is_err());
    }

    #[test]
    fn test_trial_status_serializes_camel_case() {
        let json = serde_json::to_value(TrialStatus::missing_end_date()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "isInTrial": true,
                "isExpired": true,
                "daysLeft": 0,
                "canAccess": false,
                "shouldShowNotification": false
            })
        );
    }
}
