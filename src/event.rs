//! Events - the atomic unit flowing between layers
//!
//! An event is `(t, x, y, p)`. On the sensor side `p` is the polarity,
//! after a layer it carries the cluster id.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single timestamped event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Event {
    /// Timestamp (sensor ticks, usually microseconds).
    pub t: u64,
    /// Horizontal coordinate.
    pub x: u16,
    /// Vertical coordinate.
    pub y: u16,
    /// Polarity on input, cluster id on output.
    pub p: u16,
}

/// A chronologically ordered sequence of events.
pub type Events = Vec<Event>;

impl Event {
    #[inline]
    pub fn new(t: u64, x: u16, y: u16, p: u16) -> Self {
        Self { t, x, y, p }
    }

    /// Same event with a different channel.
    #[inline]
    pub fn with_channel(self, p: u16) -> Self {
        Self { p, ..self }
    }
}

impl From<(u64, u16, u16, u16)> for Event {
    fn from((t, x, y, p): (u64, u16, u16, u16)) -> Self {
        Self::new(t, x, y, p)
    }
}

/// Check that timestamps never go backwards.
pub fn is_chronological(events: &[Event]) -> bool {
    events.windows(2).all(|w| w[0].t <= w[1].t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_channel_keeps_position() {
        let ev = Event::new(10, 3, 4, 1).with_channel(7);
        assert_eq!(ev, Event::new(10, 3, 4, 7));
    }

    #[test]
    fn test_chronological() {
        let ok: Events = vec![(1, 0, 0, 0).into(), (1, 1, 0, 0).into(), (5, 0, 0, 1).into()];
        assert!(is_chronological(&ok));

        let bad: Events = vec![(5, 0, 0, 0).into(), (4, 0, 0, 0).into()];
        assert!(!is_chronological(&bad));
        assert!(is_chronological(&[]));
    }
}
