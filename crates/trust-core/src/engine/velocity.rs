//! Rolling-window burst throttle.

use serde::{Deserialize, Serialize};

use crate::config::VelocityConfig;
use crate::domain::{Event, MS_PER_DAY};

/// Which velocity threshold an event crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityHit {
    None,
    Soft,
    Hard,
}

/// Count window-eligible events in `[ts - window, ts]` among
/// `events[..=index]`.
///
/// `events` must be sorted ascending by timestamp. Every type except
/// `selfClose` counts, whatever the type of the event at `index`.
pub fn window_count(events: &[&Event], index: usize, window_days: f64) -> usize {
    let ts = events[index].timestamp as f64;
    let start = ts - window_days * MS_PER_DAY;

    events[..=index]
        .iter()
        .rev()
        .take_while(|e| e.timestamp as f64 >= start)
        .filter(|e| e.event_type.counts_toward_velocity())
        .count()
}

/// Multiplier for a window count: 1 up to the soft cap, linearly penalized
/// up to the hard cap, 0 beyond it.
pub fn velocity_multiplier(count: usize, config: &VelocityConfig) -> (f64, VelocityHit) {
    let soft = config.soft_cap_prs as usize;
    let hard = config.hard_cap_prs as usize;

    if count <= soft {
        (1.0, VelocityHit::None)
    } else if count > hard {
        (0.0, VelocityHit::Hard)
    } else {
        let over = (count - soft) as f64;
        ((1.0 - config.penalty_per_pr * over).max(0.0), VelocityHit::Soft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventType;

    const DAY: i64 = 86_400_000;

    #[test]
    fn test_window_is_inclusive_and_skips_self_close() {
        let events = vec![
            Event::new(EventType::Approve, 0),
            Event::new(EventType::SelfClose, DAY),
            Event::new(EventType::Reject, 2 * DAY),
            Event::new(EventType::Close, 7 * DAY),
        ];
        let refs: Vec<&Event> = events.iter().collect();

        // Window [0, 7d] reaches back to the very first event.
        assert_eq!(window_count(&refs, 3, 7.0), 3);
        assert_eq!(window_count(&refs, 3, 5.0), 2);
        assert_eq!(window_count(&refs, 1, 7.0), 1);
    }

    #[test]
    fn test_window_stops_at_current_index() {
        let events = vec![
            Event::new(EventType::Approve, 0),
            Event::new(EventType::Approve, 0),
            Event::new(EventType::Approve, 0),
        ];
        let refs: Vec<&Event> = events.iter().collect();
        assert_eq!(window_count(&refs, 0, 7.0), 1);
        assert_eq!(window_count(&refs, 2, 7.0), 3);
    }

    #[test]
    fn test_velocity_thresholds() {
        let c = VelocityConfig::default();
        assert_eq!(velocity_multiplier(10, &c), (1.0, VelocityHit::None));
        let (m, hit) = velocity_multiplier(12, &c);
        assert!((m - 0.7).abs() < 1e-12);
        assert_eq!(hit, VelocityHit::Soft);
        assert_eq!(velocity_multiplier(25, &c).1, VelocityHit::Soft);
        assert_eq!(velocity_multiplier(25, &c).0, 0.0);
        assert_eq!(velocity_multiplier(26, &c), (0.0, VelocityHit::Hard));
    }
}
