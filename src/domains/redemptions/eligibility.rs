//! Eligibility checks for new redemption submissions.
//!
//! Pure and side-effect free: the service collects the inputs (twice, the
//! second time on locked rows inside the submission transaction) and the
//! checks run in a fixed order. The first failing check decides the error.

use chrono::{DateTime, Utc};

use super::models::RedemptionError;

/// The data the three checks read, captured at one point in time.
#[derive(Debug, Clone)]
pub struct EligibilitySnapshot {
    pub balance: i32,
    pub point_cost: i32,
    /// Requests in `pending` or `processing`.
    pub outstanding_count: i64,
    pub max_pending: i64,
    /// Creation time of the most recent request, any status.
    pub last_request_at: Option<DateTime<Utc>>,
    pub cooldown_hours: i64,
}

impl EligibilitySnapshot {
    /// Check order: balance, pending limit, cooldown.
    pub fn check(&self, now: DateTime<Utc>) -> Result<(), RedemptionError> {
        if self.balance < self.point_cost {
            return Err(RedemptionError::InsufficientPoints {
                required: self.point_cost,
                available: self.balance,
            });
        }

        if self.outstanding_count >= self.max_pending {
            return Err(RedemptionError::MaxPendingRequests {
                limit: self.max_pending,
            });
        }

        if let Some(last) = self.last_request_at {
            if let Some(remaining_hours) =
                cooldown_remaining_hours(last, now, self.cooldown_hours)
            {
                return Err(RedemptionError::CooldownActive { remaining_hours });
            }
        }

        Ok(())
    }
}

/// Hours left in the cooldown window, rounded up to the next whole hour.
/// `None` once the window has passed. Minute precision, so a request made
/// 61 minutes into a 24 hour cooldown still reports 23 hours remaining.
fn cooldown_remaining_hours(
    last_request_at: DateTime<Utc>,
    now: DateTime<Utc>,
    cooldown_hours: i64,
) -> Option<i64> {
    if cooldown_hours <= 0 {
        return None;
    }

    let elapsed_minutes = (now - last_request_at).num_minutes();
    let cooldown_minutes = cooldown_hours * 60;

    if elapsed_minutes >= cooldown_minutes {
        return None;
    }

    let remaining_minutes = cooldown_minutes - elapsed_minutes;
    Some((remaining_minutes + 59) / 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn snapshot() -> EligibilitySnapshot {
        EligibilitySnapshot {
            balance: 500,
            point_cost: 100,
            outstanding_count: 0,
            max_pending: 1,
            last_request_at: None,
            cooldown_hours: 24,
        }
    }

    fn now() -> DateTime<Utc> {
        "2026-03-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_eligible_user_passes() {
        assert!(snapshot().check(now()).is_ok());
    }

    #[test]
    fn test_insufficient_balance() {
        let mut s = snapshot();
        s.balance = 50;
        let err = s.check(now()).unwrap_err();
        assert!(matches!(
            err,
            RedemptionError::InsufficientPoints {
                required: 100,
                available: 50
            }
        ));
    }

    #[test]
    fn test_pending_limit() {
        let mut s = snapshot();
        s.outstanding_count = 1;
        let err = s.check(now()).unwrap_err();
        assert!(matches!(err, RedemptionError::MaxPendingRequests { limit: 1 }));
    }

    #[test]
    fn test_cooldown_one_hour_elapsed_reports_23_remaining() {
        let mut s = snapshot();
        s.last_request_at = Some(now() - Duration::hours(1));
        let err = s.check(now()).unwrap_err();
        assert!(matches!(
            err,
            RedemptionError::CooldownActive { remaining_hours: 23 }
        ));
    }

    #[test]
    fn test_cooldown_rounds_up_partial_hours() {
        let mut s = snapshot();
        // 61 minutes elapsed leaves 22h 59m, which reports as 23.
        s.last_request_at = Some(now() - Duration::minutes(61));
        let err = s.check(now()).unwrap_err();
        assert!(matches!(
            err,
            RedemptionError::CooldownActive { remaining_hours: 23 }
        ));

        // A request made just now reports the full window.
        let mut s = snapshot();
        s.last_request_at = Some(now());
        let err = s.check(now()).unwrap_err();
        assert!(matches!(
            err,
            RedemptionError::CooldownActive { remaining_hours: 24 }
        ));
    }

    #[test]
    fn test_cooldown_expired_passes() {
        let mut s = snapshot();
        s.last_request_at = Some(now() - Duration::hours(24));
        assert!(s.check(now()).is_ok());

        s.last_request_at = Some(now() - Duration::hours(30));
        assert!(s.check(now()).is_ok());
    }

    #[test]
    fn test_zero_cooldown_never_blocks() {
        let mut s = snapshot();
        s.cooldown_hours = 0;
        s.last_request_at = Some(now());
        assert!(s.check(now()).is_ok());
    }

    #[test]
    fn test_balance_check_wins_over_later_checks() {
        // All three would fail; the balance error is the one reported.
        let mut s = snapshot();
        s.balance = 0;
        s.outstanding_count = 5;
        s.last_request_at = Some(now());
        let err = s.check(now()).unwrap_err();
        assert!(matches!(err, RedemptionError::InsufficientPoints { .. }));
    }

    #[test]
    fn test_pending_check_wins_over_cooldown() {
        let mut s = snapshot();
        s.outstanding_count = 1;
        s.last_request_at = Some(now());
        let err = s.check(now()).unwrap_err();
        assert!(matches!(err, RedemptionError::MaxPendingRequests { .. }));
    }
}
