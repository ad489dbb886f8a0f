//! Trial status evaluation

use std::sync::Arc;

use chrono::{DateTime, Utc};
use vetdesk_types::{SubscriptionStatus, TrialStatus, TrialWindow};

use crate::clock::Clock;

const MICROS_PER_DAY: i64 = 24 * 60 * 60 * 1_000_000;
const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Whole days from `now` until `end`, rounded up.
///
/// Negative when `end` is in the past; a partial day counts as a full one,
/// down to the microsecond.
pub fn days_until(end: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let delta = end - now;
    // Microseconds overflow past ~292k years; milliseconds are exact enough there
    let (units, per_day) = match delta.num_microseconds() {
        Some(micros) => (micros, MICROS_PER_DAY),
        None => (delta.num_milliseconds(), MILLIS_PER_DAY),
    };
    // Integer division truncates toward zero, which is already the ceiling
    // for negative values.
    let days = units / per_day;
    if units % per_day > 0 {
        days + 1
    } else {
        days
    }
}

/// Evaluate a trial window at `now`.
pub fn evaluate_trial(window: &TrialWindow, now: DateTime<Utc>, notification_days: u32) -> TrialStatus {
    if window.subscription_status != SubscriptionStatus::Trial {
        return TrialStatus::not_in_trial();
    }

    let Some(end) = window.trial_end_date else {
        return TrialStatus::missing_end_date();
    };

    let days = days_until(end, now);
    let is_expired = days <= 0;

    TrialStatus {
        is_in_trial: true,
        is_expired,
        days_left: u32::try_from(days.max(0)).unwrap_or(u32::MAX),
        can_access: !is_expired,
        should_show_notification: days > 0 && days <= i64::from(notification_days),
    }
}

/// Trial evaluator bound to a clock and notification window
#[derive(Clone)]
pub struct TrialStatusEvaluator {
    clock: Arc<dyn Clock>,
    notification_days: u32,
}

impl TrialStatusEvaluator {
    /// Create an evaluator with the default 14-day notification window
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            notification_days: 14,
        }
    }

    /// Override the notification window
    pub fn with_notification_days(mut self, days: u32) -> Self {
        self.notification_days = days;
        self
    }

    /// Evaluate at the clock's current time
    pub fn evaluate(&self, window: &TrialWindow) -> TrialStatus {
        evaluate_trial(window, self.clock.now(), self.notification_days)
    }
}

impl std::fmt::Debug for TrialStatusEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrialStatusEvaluator")
            .field("notification_days", &self.notification_days)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    fn evaluator() -> TrialStatusEvaluator {
        TrialStatusEvaluator::new(Arc::new(ManualClock::new(now())))
    }

    #[test]
    fn test_non_trial_statuses_always_have_access() {
        for status in [
            SubscriptionStatus::Active,
            SubscriptionStatus::Suspended,
            SubscriptionStatus::Cancelled,
        ] {
            for end in [None, Some(now() - Duration::days(30)), Some(now() + Duration::days(3))] {
                let window = TrialWindow {
                    subscription_status: status,
                    trial_end_date: end,
                };
                assert_eq!(evaluator().evaluate(&window), TrialStatus::not_in_trial());
            }
        }
    }

    #[test]
    fn test_trial_without_end_date_fails_closed() {
        let status = evaluator().evaluate(&TrialWindow::trial(None));
        assert_eq!(
            status,
            TrialStatus {
                is_in_trial: true,
                is_expired: true,
                days_left: 0,
                can_access: false,
                should_show_notification: false,
            }
        );
    }

    #[test]
    fn test_five_days_left() {
        let status = evaluator().evaluate(&TrialWindow::trial(Some(now() + Duration::days(5))));
        assert!(status.is_in_trial);
        assert_eq!(status.days_left, 5);
        assert!(!status.is_expired);
        assert!(status.can_access);
        assert!(status.should_show_notification);
    }

    #[test]
    fn test_ended_yesterday() {
        let status = evaluator().evaluate(&TrialWindow::trial(Some(now() - Duration::days(1))));
        assert!(status.is_expired);
        assert!(!status.can_access);
        assert_eq!(status.days_left, 0);
        assert!(!status.should_show_notification);
    }

    #[test]
    fn test_outside_notification_window() {
        let status = evaluator().evaluate(&TrialWindow::trial(Some(now() + Duration::days(20))));
        assert_eq!(status.days_left, 20);
        assert!(status.can_access);
        assert!(!status.should_show_notification);
    }

    #[test]
    fn test_notification_window_edges() {
        let at_14 = evaluator().evaluate(&TrialWindow::trial(Some(now() + Duration::days(14))));
        assert!(at_14.should_show_notification);

        let at_15 = evaluator().evaluate(&TrialWindow::trial(Some(now() + Duration::days(15))));
        assert!(!at_15.should_show_notification);
    }

    #[test]
    fn test_partial_day_rounds_up() {
        let status = evaluator().evaluate(&TrialWindow::trial(Some(now() + Duration::hours(1))));
        assert_eq!(status.days_left, 1);
        assert!(status.can_access);

        let status = evaluator().evaluate(&TrialWindow::trial(Some(
            now() + Duration::days(2) + Duration::seconds(1),
        )));
        assert_eq!(status.days_left, 3);
    }

    #[test]
    fn test_trial_ending_exactly_now_is_expired() {
        let status = evaluator().evaluate(&TrialWindow::trial(Some(now())));
        assert!(status.is_expired);
        assert!(!status.can_access);
    }

    #[test]
    fn test_less_than_a_day_ago_is_expired() {
        let status = evaluator().evaluate(&TrialWindow::trial(Some(now() - Duration::hours(5))));
        assert!(status.is_expired);
        assert_eq!(status.days_left, 0);
    }

    #[test]
    fn test_custom_notification_window() {
        let eval = evaluator().with_notification_days(3);
        assert!(!eval
            .evaluate(&TrialWindow::trial(Some(now() + Duration::days(5))))
            .should_show_notification);
        assert!(eval
            .evaluate(&TrialWindow::trial(Some(now() + Duration::days(3))))
            .should_show_notification);
    }

    #[test]
    fn test_days_until_ceiling() {
        assert_eq!(days_until(now() + Duration::days(1), now()), 1);
        assert_eq!(days_until(now() + Duration::milliseconds(1), now()), 1);
        assert_eq!(days_until(now(), now()), 0);
        assert_eq!(days_until(now() - Duration::hours(12), now()), 0);
        assert_eq!(days_until(now() - Duration::days(1), now()), -1);
        assert_eq!(days_until(now() - Duration::hours(36), now()), -1);
    }

    #[test]
    fn test_sub_millisecond_remainder_still_counts() {
        let end = now() + Duration::microseconds(500);
        assert_eq!(days_until(end, now()), 1);

        let status = evaluate_trial(&TrialWindow::trial(Some(end)), now(), 14);
        assert!(status.can_access);
        assert!(!status.is_expired);
        assert_eq!(status.days_left, 1);

        assert_eq!(days_until(now() - Duration::microseconds(500), now()), 0);
    }
}
