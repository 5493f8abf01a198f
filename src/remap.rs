//! Event remappers - reshape a layer's output events
//!
//! A remapper changes the coordinates or channel of an emitted event and
//! never its timestamp.

use crate::error::{HotsError, Result};
use crate::event::Event;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Remaps an event given the cluster id assigned to it.
pub trait EventRemapper {
    fn remap_event(&self, ev: Event, k: u16) -> Event;
}

/// ArrayHOTS output: `{t, k, y, 0}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArrayLayer;

impl EventRemapper for ArrayLayer {
    fn remap_event(&self, ev: Event, k: u16) -> Event {
        Event::new(ev.t, k, ev.y, 0)
    }
}

/// Flattens `(x, y, k)` to one dimension: `{t, w*h*k + w*y + x, 0, 0}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SerializingLayer {
    w: u16,
    h: u16,
}

impl SerializingLayer {
    pub fn new(width: u16, height: u16) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(HotsError::Config(format!(
                "serializing context must be non-empty, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            w: width,
            h: height,
        })
    }

    /// `(width, height)` of the context.
    pub fn size(&self) -> (u16, u16) {
        (self.w, self.h)
    }

    /// Linear index of `(x, y, k)` before narrowing to the event field.
    pub fn index(&self, x: u16, y: u16, k: u16) -> u64 {
        let (w, h) = (self.w as u64, self.h as u64);
        w * h * k as u64 + w * y as u64 + x as u64
    }

    /// Recover `(x, y, k)` from a linear index.
    pub fn decode(&self, index: u64) -> (u16, u16, u16) {
        let (w, h) = (self.w as u64, self.h as u64);
        let plane = w * h;
        let k = index / plane;
        let rem = index % plane;
        ((rem % w) as u16, (rem / w) as u16, k as u16)
    }

    /// Remap, failing when the index does not fit an event coordinate.
    pub fn try_remap_event(&self, ev: Event, k: u16) -> Result<Event> {
        let idx = self.index(ev.x, ev.y, k);
        let x = u16::try_from(idx).map_err(|_| {
            HotsError::InvalidEvent(format!(
                "serialized index {} for ({}, {}, k={}) exceeds u16",
                idx, ev.x, ev.y, k
            ))
        })?;
        Ok(Event::new(ev.t, x, 0, 0))
    }
}

impl EventRemapper for SerializingLayer {
    /// Indices beyond `u16::MAX` saturate; use `try_remap_event` to detect them.
    fn remap_event(&self, ev: Event, k: u16) -> Event {
        let idx = self.index(ev.x, ev.y, k).min(u16::MAX as u64) as u16;
        Event::new(ev.t, idx, 0, 0)
    }
}

/// Value-dispatched choice of remapper.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Remapper {
    Array(ArrayLayer),
    Serializing(SerializingLayer),
}

impl Remapper {
    /// Remap, failing instead of saturating when a serialized index overflows.
    pub fn try_remap_event(&self, ev: Event, k: u16) -> Result<Event> {
        match self {
            Remapper::Array(r) => Ok(r.remap_event(ev, k)),
            Remapper::Serializing(r) => r.try_remap_event(ev, k),
        }
    }
}

impl EventRemapper for Remapper {
    fn remap_event(&self, ev: Event, k: u16) -> Event {
        match self {
            Remapper::Array(r) => r.remap_event(ev, k),
            Remapper::Serializing(r) => r.remap_event(ev, k),
        }
    }
}

impl From<ArrayLayer> for Remapper {
    fn from(r: ArrayLayer) -> Self {
        Remapper::Array(r)
    }
}

impl From<SerializingLayer> for Remapper {
    fn from(r: SerializingLayer) -> Self {
        Remapper::Serializing(r)
    }
}
