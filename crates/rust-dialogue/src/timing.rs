//! Simulated typing latency and inter-turn delay.
//!
//! Both functions are pure apart from the random source passed in, so the
//! engine can seed it for reproducible conversations.

use std::time::Duration;

use rand::Rng;

use crate::config::FlowConfig;

/// Characters per second typed at speed 10.
pub const BASE_CHARS_PER_SECOND: f64 = 12.0;

/// Characters per second at the configured (clamped) speed.
#[must_use]
pub fn chars_per_second(config: &FlowConfig) -> f64 {
    BASE_CHARS_PER_SECOND * (config.effective_speed() / 10.0)
}

/// How long "typing" `text` takes before it is revealed.
///
/// Zero when the wait is not character dependent. Otherwise the number of
/// characters (Unicode scalar values) divided by the typing rate, rounded to
/// the nearest millisecond.
#[must_use]
pub fn typing_wait(text: &str, config: &FlowConfig) -> Duration {
    if !config.character_dependent_wait {
        return Duration::ZERO;
    }

    let chars = text.chars().count() as f64;
    let millis = (chars / chars_per_second(config) * 1000.0).round();
    Duration::from_millis(millis as u64)
}

/// Delay between finishing one node and beginning the next.
///
/// A uniformly random whole number of milliseconds in the configured range
/// when one is usable, else the fixed delay.
pub fn inter_turn_delay<R: Rng>(config: &FlowConfig, rng: &mut R) -> Duration {
    match config.random_delay_range() {
        Some((lo, hi)) => Duration::from_millis(rng.random_range(lo..=hi)),
        None => config.delay,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn typing_wait_default_speed() {
        // 6 chars/s at speed 5: 12 chars take 2 s.
        let config = FlowConfig::default();
        assert_eq!(typing_wait("Hello world!", &config), Duration::from_secs(2));
    }

    #[test]
    fn typing_wait_rounds_to_millis() {
        // 1 char at 6 chars/s = 166.67 ms.
        let config = FlowConfig::default();
        assert_eq!(typing_wait("a", &config), Duration::from_millis(167));
    }

    #[test]
    fn typing_wait_counts_chars_not_bytes() {
        let config = FlowConfig::default().speed(10.0);
        assert_eq!(typing_wait("héllo", &config), typing_wait("hello", &config));
    }

    #[test]
    fn typing_wait_zero_for_empty_text() {
        assert_eq!(typing_wait("", &FlowConfig::default()), Duration::ZERO);
    }

    #[test]
    fn typing_wait_disabled() {
        let config = FlowConfig::default().character_dependent_wait(false);
        assert_eq!(typing_wait("a long sentence", &config), Duration::ZERO);
    }

    #[test]
    fn typing_wait_clamps_speed() {
        let slowest = FlowConfig::default().speed(1.0);
        let below = FlowConfig::default().speed(0.0);
        assert_eq!(typing_wait("abc", &slowest), typing_wait("abc", &below));
    }

    #[test]
    fn faster_speed_waits_less() {
        let slow = FlowConfig::default().speed(2.0);
        let fast = FlowConfig::default().speed(9.0);
        assert!(typing_wait("some text", &fast) < typing_wait("some text", &slow));
    }

    #[test]
    fn fixed_delay() {
        let config = FlowConfig::default().delay_ms(400);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(inter_turn_delay(&config, &mut rng), Duration::from_millis(400));
    }

    #[test]
    fn degenerate_range_is_exact() {
        let config = FlowConfig::default().delay_min_max(100, 100);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(inter_turn_delay(&config, &mut rng), Duration::from_millis(100));
        }
    }

    #[test]
    fn random_delay_stays_in_range() {
        let config = FlowConfig::default().delay(Duration::from_secs(9)).delay_min_max(50, 80);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let d = inter_turn_delay(&config, &mut rng);
            assert!(d >= Duration::from_millis(50) && d <= Duration::from_millis(80));
        }
    }

    #[test]
    fn unusable_range_falls_back_to_fixed_delay() {
        let config = FlowConfig::default().delay_ms(30).delay_min_max(0, 80);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(inter_turn_delay(&config, &mut rng), Duration::from_millis(30));
    }
}
