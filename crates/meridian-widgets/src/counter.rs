//! Animated statistic counters (`.stats_card-percentage[data-target]`).

use std::num::ParseIntError;
use std::time::Duration;

/// Frame values for counting up from zero to a target.
///
/// Values never decrease and the last one is always exactly `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterAnimation {
    target: u32,
    steps: u32,
    step: u32,
}

impl CounterAnimation {
    pub fn new(target: u32, duration: Duration, frame: Duration) -> Self {
        let steps = if frame.is_zero() {
            1
        } else {
            (duration.as_millis() / frame.as_millis().max(1)).clamp(1, u32::MAX as u128) as u32
        };

        Self {
            target,
            steps,
            step: 0,
        }
    }

    /// Build from a `data-target` attribute such as `"95"` or `"95%"`.
    pub fn from_attr(
        value: &str,
        duration: Duration,
        frame: Duration,
    ) -> Result<Self, ParseIntError> {
        let target = value.trim().trim_end_matches('%').trim().parse()?;
        Ok(Self::new(target, duration, frame))
    }

    pub fn target(&self) -> u32 {
        self.target
    }
}

impl Iterator for CounterAnimation {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.step >= self.steps {
            return None;
        }
        self.step += 1;

        let value =
            (u64::from(self.target) * u64::from(self.step)).div_ceil(u64::from(self.steps));
        Some(value as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_up_to_target() {
        let frames: Vec<_> =
            CounterAnimation::new(10, Duration::from_millis(400), Duration::from_millis(100))
                .collect();

        assert_eq!(frames, vec![3, 5, 8, 10]);
    }

    #[test]
    fn values_never_decrease() {
        let frames: Vec<_> =
            CounterAnimation::new(7, Duration::from_secs(2), Duration::from_millis(16)).collect();

        assert!(frames.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(frames.last(), Some(&7));
    }

    #[test]
    fn parses_percentage_attribute() {
        let counter =
            CounterAnimation::from_attr(" 95% ", Duration::from_secs(1), Duration::ZERO).unwrap();

        assert_eq!(counter.target(), 95);
        assert_eq!(counter.collect::<Vec<_>>(), vec![95]);
        assert!(CounterAnimation::from_attr("n/a", Duration::ZERO, Duration::ZERO).is_err());
    }
}
