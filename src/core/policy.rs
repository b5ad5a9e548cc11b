//! Trigger policy: may an out-of-band trigger move a traverser right now?
//!
//! The decision is a pure function of the current state's metadata, the
//! traverser's last-update timestamp and the clock reading passed in. It
//! performs no I/O, so the engine's race-avoidance rules can be tested
//! without a store.

use super::state::StateMetadata;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Why a trigger was deferred into the traverser's queue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeferReason {
    /// The current state cannot be interrupted.
    NotExitable,

    /// The traverser entered its state inside the debounce window.
    Debounced { elapsed: Duration },
}

/// Result of evaluating the trigger policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TriggerDecision {
    Apply,
    Defer(DeferReason),
}

/// Exitability plus debounce guard for out-of-band triggers.
///
/// # Example
///
/// ```rust
/// use traversal::core::{DeferReason, StateMetadata, TriggerDecision, TriggerPolicy};
/// use chrono::{Duration as ChronoDuration, Utc};
/// use std::time::Duration;
///
/// let policy = TriggerPolicy::new(Duration::from_secs(5));
/// let now = Utc::now();
///
/// let locked = StateMetadata::new("checkout", false);
/// assert_eq!(
///     policy.decide(&locked, now - ChronoDuration::hours(1), now),
///     TriggerDecision::Defer(DeferReason::NotExitable)
/// );
///
/// let idle = StateMetadata::new("idle", true);
/// assert_eq!(
///     policy.decide(&idle, now - ChronoDuration::hours(1), now),
///     TriggerDecision::Apply
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerPolicy {
    debounce_window: Duration,
}

impl TriggerPolicy {
    pub fn new(debounce_window: Duration) -> Self {
        Self { debounce_window }
    }

    pub fn debounce_window(&self) -> Duration {
        self.debounce_window
    }

    /// Decide whether to apply a trigger now or defer it.
    ///
    /// A last-update timestamp later than `now` counts as recent.
    pub fn decide(
        &self,
        current: &StateMetadata,
        last_update: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> TriggerDecision {
        if !current.is_exitable() {
            return TriggerDecision::Defer(DeferReason::NotExitable);
        }
        if self.debounce_window.is_zero() {
            return TriggerDecision::Apply;
        }

        match now.signed_duration_since(last_update).to_std() {
            Ok(elapsed) if elapsed >= self.debounce_window => TriggerDecision::Apply,
            Ok(elapsed) => TriggerDecision::Defer(DeferReason::Debounced { elapsed }),
            Err(_) => TriggerDecision::Defer(DeferReason::Debounced {
                elapsed: Duration::ZERO,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn policy() -> TriggerPolicy {
        TriggerPolicy::new(Duration::from_secs(5))
    }

    #[test]
    fn non_exitable_state_always_defers() {
        let now = Utc::now();
        let meta = StateMetadata::new("middle", false);

        for age in [0, 4, 6, 3600] {
            let decision = policy().decide(&meta, now - ChronoDuration::seconds(age), now);
            assert_eq!(decision, TriggerDecision::Defer(DeferReason::NotExitable));
        }
    }

    #[test]
    fn recent_entry_is_debounced() {
        let now = Utc::now();
        let meta = StateMetadata::new("start", true);

        let decision = policy().decide(&meta, now - ChronoDuration::seconds(2), now);
        assert_eq!(
            decision,
            TriggerDecision::Defer(DeferReason::Debounced {
                elapsed: Duration::from_secs(2)
            })
        );
    }

    #[test]
    fn stale_entry_applies() {
        let now = Utc::now();
        let meta = StateMetadata::new("start", true);

        assert_eq!(
            policy().decide(&meta, now - ChronoDuration::seconds(5), now),
            TriggerDecision::Apply
        );
        assert_eq!(
            policy().decide(&meta, now - ChronoDuration::days(1), now),
            TriggerDecision::Apply
        );
    }

    #[test]
    fn future_timestamp_counts_as_recent() {
        let now = Utc::now();
        let meta = StateMetadata::new("start", true);

        let decision = policy().decide(&meta, now + ChronoDuration::seconds(30), now);
        assert!(matches!(
            decision,
            TriggerDecision::Defer(DeferReason::Debounced { .. })
        ));
    }

    #[test]
    fn zero_window_disables_debounce() {
        let now = Utc::now();
        let meta = StateMetadata::new("start", true);
        let policy = TriggerPolicy::new(Duration::ZERO);

        assert_eq!(policy.decide(&meta, now, now), TriggerDecision::Apply);
    }
}
