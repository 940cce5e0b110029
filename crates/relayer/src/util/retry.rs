use core::time::Duration;

pub use retry::{
    delay::Fixed, retry_with_index, Error as RetryError, OperationResult as RetryResult,
};

/// Delays between the attempts of an operation tried at most `max_attempts`
/// times, waiting `delay` between two consecutive attempts.
///
/// `retry_with_index` performs one attempt more than the number of delays
/// it is given, hence the `- 1`.
pub fn fixed_delays(delay: Duration, max_attempts: u32) -> impl Iterator<Item = Duration> {
    let delays = usize::try_from(max_attempts.saturating_sub(1)).unwrap_or(usize::MAX);

    Fixed::from(delay).take(delays)
}
