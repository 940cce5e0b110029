//! Computes when a light client is due for its next update, and suspends the
//! calling worker until then.
//!
//! The deadline is anchored on the timestamp of the latest header trusted by
//! the client, not on the time the previous cycle ran. A late, skipped or
//! restarted cycle therefore never shifts the schedule.

use core::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use flex_error::define_error;

use ibc_refresher_types::{
    client_state::ClientState,
    timestamp::{Timestamp, TimestampOverflowError},
};

define_error! {
    ScheduleError {
        Overflow
            {
                latest_timestamp: Timestamp,
                interval: Duration,
            }
            [ TimestampOverflowError ]
            |e| {
                format_args!("next refresh time overflows: {} + {}",
                    e.latest_timestamp, humantime::format_duration(e.interval))
            },
    }
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The wall clock.
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Whether a refresh should happen now or later.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Deadline {
    /// The refresh time has been reached or is already past.
    Due,

    /// The refresh time is this far in the future.
    Pending(Duration),
}

impl Deadline {
    /// Classify `next` against `now`.
    pub fn at(next: Timestamp, now: Timestamp) -> Self {
        match next.duration_since(&now) {
            Some(remaining) if !remaining.is_zero() => Deadline::Pending(remaining),
            _ => Deadline::Due,
        }
    }

    pub fn is_due(&self) -> bool {
        matches!(self, Deadline::Due)
    }
}

/// Outcome of [`wait_until`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Wait {
    Elapsed,
    Cancelled,
}

/// Refresh a light client every `interval`, measured from its latest
/// trusted timestamp.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RefreshSchedule {
    interval: Duration,
}

impl RefreshSchedule {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// `latest_timestamp + interval`
    pub fn next_refresh(&self, client_state: &impl ClientState) -> Result<Timestamp, ScheduleError> {
        let latest_timestamp = client_state.latest_timestamp();

        (latest_timestamp + self.interval)
            .map_err(|e| ScheduleError::overflow(latest_timestamp, self.interval, e))
    }

    /// Compute the next refresh time of the client and classify it against
    /// the current time given by `clock`.
    pub fn deadline(
        &self,
        client_state: &impl ClientState,
        clock: &dyn Clock,
    ) -> Result<(Timestamp, Deadline), ScheduleError> {
        let next = self.next_refresh(client_state)?;

        Ok((next, Deadline::at(next, clock.now())))
    }
}

/// Block until the deadline is reached, or until a shutdown signal is
/// received on `shutdown`. Returns immediately if the deadline is due.
///
/// A disconnected shutdown channel counts as a shutdown signal.
pub fn wait_until(deadline: Deadline, shutdown: &Receiver<()>) -> Wait {
    match deadline {
        Deadline::Due => Wait::Elapsed,
        Deadline::Pending(remaining) => match shutdown.recv_timeout(remaining) {
            Err(RecvTimeoutError::Timeout) => Wait::Elapsed,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => Wait::Cancelled,
        },
    }
}

/// Block for `duration`, unless a shutdown signal is received first.
pub fn pause(duration: Duration, shutdown: &Receiver<()>) -> Wait {
    wait_until(Deadline::Pending(duration), shutdown)
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use ibc_refresher_types::{
        client_state::{AnyClientState, MockClientState},
        height::Height,
        identifier::ChainId,
    };
    use test_log::test;

    struct FixedClock(Timestamp);

    impl Clock for FixedClock {
        fn now(&self) -> Timestamp {
            self.0
        }
    }

    fn client_at(latest_timestamp: Timestamp) -> AnyClientState {
        MockClientState {
            chain_id: ChainId::from_string("ibc-1"),
            latest_height: Height::new(1, 5).unwrap(),
            latest_timestamp,
            trusting_period: Duration::from_secs(3600),
            frozen: false,
        }
        .into()
    }

    fn secs(s: u64) -> Timestamp {
        Timestamp::from_nanoseconds(s * 1_000_000_000).unwrap()
    }

    #[test]
    fn next_refresh_is_latest_timestamp_plus_interval() {
        let schedule = RefreshSchedule::new(Duration::from_secs(120));

        for t in [0, 1, 1_000, 1_700_000_000] {
            let next = schedule.next_refresh(&client_at(secs(t))).unwrap();
            assert_eq!(next, secs(t + 120));
        }
    }

    #[test]
    fn pending_iff_next_is_after_now() {
        let schedule = RefreshSchedule::new(Duration::from_secs(120));
        let client = client_at(secs(1_000));

        let (_, deadline) = schedule.deadline(&client, &FixedClock(secs(1_000))).unwrap();
        assert_eq!(deadline, Deadline::Pending(Duration::from_secs(120)));

        let (_, deadline) = schedule.deadline(&client, &FixedClock(secs(1_119))).unwrap();
        assert_eq!(deadline, Deadline::Pending(Duration::from_secs(1)));

        let (_, deadline) = schedule.deadline(&client, &FixedClock(secs(1_120))).unwrap();
        assert_eq!(deadline, Deadline::Due);

        let (_, deadline) = schedule.deadline(&client, &FixedClock(secs(5_000))).unwrap();
        assert_eq!(deadline, Deadline::Due);
    }

    #[test]
    fn overdue_client_is_due_immediately() {
        let now = Timestamp::now();
        let five_minutes_ago = (now - Duration::from_secs(300)).unwrap();

        let schedule = RefreshSchedule::new(Duration::from_secs(120));
        let (_, deadline) = schedule
            .deadline(&client_at(five_minutes_ago), &SystemClock)
            .unwrap();

        assert!(deadline.is_due());

        let (_sender, shutdown) = crossbeam_channel::bounded(1);
        let start = Instant::now();
        assert_eq!(wait_until(deadline, &shutdown), Wait::Elapsed);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn overflow_is_an_error() {
        let schedule = RefreshSchedule::new(Duration::from_secs(u64::MAX));
        assert!(schedule.next_refresh(&client_at(Timestamp::now())).is_err());
    }

    #[test]
    fn wait_elapses_after_remaining_time() {
        let (_sender, shutdown) = crossbeam_channel::bounded(1);

        let start = Instant::now();
        let wait = wait_until(Deadline::Pending(Duration::from_millis(50)), &shutdown);

        assert_eq!(wait, Wait::Elapsed);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn wait_is_cancelled_by_shutdown() {
        let (sender, shutdown) = crossbeam_channel::bounded(1);
        sender.send(()).unwrap();

        let start = Instant::now();
        let wait = wait_until(Deadline::Pending(Duration::from_secs(60)), &shutdown);

        assert_eq!(wait, Wait::Cancelled);
        assert!(start.elapsed() < Duration::from_secs(30));
    }
}
