//! Capability traits for anything events flow through
//!
//! ## Processor
//!
//! The only interface the driver needs: `reset()` then `process()` per event.
//! Single layers and whole networks implement it alike.
//!
//! ## Classifier + TimeSurfacePool
//!
//! Required only for training: a layer must expose the surfaces it would
//! classify and accept a freshly initialized codebook.
//!
//! ## SurfaceKernel + Clusterer
//!
//! The numeric pieces a [`Layer`](crate::Layer) is assembled from. How a
//! surface decays or how a prototype moves is up to the implementor.

use crate::error::Result;
use crate::event::{Event, Events};
use crate::surface::TimeSurface;

/// Something that turns events into events.
pub trait Processor {
    /// Forget everything seen so far.
    fn reset(&mut self);

    /// Process one event, returning what it emits (possibly nothing).
    ///
    /// With `skip_check` every event is treated as valid; otherwise the
    /// processor decides what is valid and may fail.
    fn process(&mut self, ev: &Event, skip_check: bool) -> Result<Events>;
}

impl<P: Processor + ?Sized> Processor for &mut P {
    fn reset(&mut self) {
        (**self).reset()
    }

    fn process(&mut self, ev: &Event, skip_check: bool) -> Result<Events> {
        (**self).process(ev, skip_check)
    }
}

impl<P: Processor + ?Sized> Processor for Box<P> {
    fn reset(&mut self) {
        (**self).reset()
    }

    fn process(&mut self, ev: &Event, skip_check: bool) -> Result<Events> {
        (**self).process(ev, skip_check)
    }
}

/// Holds a codebook of prototypes and can be switched into learning mode.
pub trait Classifier {
    /// Install a new codebook.
    fn set_prototypes(&mut self, prototypes: Vec<TimeSurface>) -> Result<()>;

    fn prototypes(&self) -> &[TimeSurface];

    fn is_initialized(&self) -> bool {
        !self.prototypes().is_empty()
    }

    /// Enable or disable online learning, returning the previous state.
    fn toggle_learning(&mut self, enabled: bool) -> bool;
}

/// Exposes the time surfaces a layer computes.
pub trait TimeSurfacePool {
    /// Reset, replay `events` without classifying and return every surface
    /// that would have been classified.
    fn sample_time_surfaces(&mut self, events: &[Event], skip_check: bool)
        -> Result<Vec<TimeSurface>>;
}

impl<T: Classifier + ?Sized> Classifier for Box<T> {
    fn set_prototypes(&mut self, prototypes: Vec<TimeSurface>) -> Result<()> {
        (**self).set_prototypes(prototypes)
    }

    fn prototypes(&self) -> &[TimeSurface] {
        (**self).prototypes()
    }

    fn is_initialized(&self) -> bool {
        (**self).is_initialized()
    }

    fn toggle_learning(&mut self, enabled: bool) -> bool {
        (**self).toggle_learning(enabled)
    }
}

impl<T: TimeSurfacePool + ?Sized> TimeSurfacePool for Box<T> {
    fn sample_time_surfaces(
        &mut self,
        events: &[Event],
        skip_check: bool,
    ) -> Result<Vec<TimeSurface>> {
        (**self).sample_time_surfaces(events, skip_check)
    }
}

/// A layer that can take part in layer-by-layer training.
pub trait TrainableLayer: Processor + Classifier + TimeSurfacePool {}

impl<T: Processor + Classifier + TimeSurfacePool + ?Sized> TrainableLayer for T {}

/// Numeric time-surface kernel.
pub trait SurfaceKernel {
    /// Forget all recorded activity.
    fn reset(&mut self);

    /// Record an event.
    fn update(&mut self, ev: &Event);

    /// Surface around `(x, y)` on `channel` at time `t`, plus whether it
    /// carries enough activity to be worth classifying.
    fn compute(&self, t: u64, x: u16, y: u16, channel: u16) -> (TimeSurface, bool);
}

/// Clustering algorithm over time surfaces.
pub trait Clusterer {
    /// Index of the prototype assigned to `ts`. In learning mode the
    /// prototypes may be updated as a side effect.
    fn cluster(&mut self, ts: &TimeSurface) -> Result<u16>;

    fn set_prototypes(&mut self, prototypes: Vec<TimeSurface>);

    fn prototypes(&self) -> &[TimeSurface];

    /// Enable or disable learning, returning the previous state.
    fn toggle_learning(&mut self, enabled: bool) -> bool;

    fn is_learning(&self) -> bool;
}

/// Builds a starting codebook from sampled time surfaces.
pub trait ClustererInitializer {
    fn initialize(&mut self, surfaces: &[TimeSurface]) -> Result<Vec<TimeSurface>>;
}

impl<F> ClustererInitializer for F
where
    F: FnMut(&[TimeSurface]) -> Result<Vec<TimeSurface>>,
{
    fn initialize(&mut self, surfaces: &[TimeSurface]) -> Result<Vec<TimeSurface>> {
        self(surfaces)
    }
}
