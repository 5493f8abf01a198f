//! Test doubles shared by the unit tests

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{HotsError, Result};
use crate::event::{Event, Events};
use crate::processor::{Clusterer, Processor, SurfaceKernel};
use crate::surface::TimeSurface;

/// 2x1 surface holding a position.
pub fn surface_at(x: u16, y: u16) -> TimeSurface {
    TimeSurface::from_vec(2, 1, vec![x as f32, y as f32]).unwrap()
}

/// Kernel whose surface is simply the queried position.
#[derive(Clone, Debug, Default)]
pub struct PositionKernel {
    pub updates: usize,
    pub resets: usize,
    /// Surfaces are "good" once this many events were recorded.
    pub min_updates: usize,
}

impl SurfaceKernel for PositionKernel {
    fn reset(&mut self) {
        self.updates = 0;
        self.resets += 1;
    }

    fn update(&mut self, _ev: &Event) {
        self.updates += 1;
    }

    fn compute(&self, _t: u64, x: u16, y: u16, _channel: u16) -> (TimeSurface, bool) {
        (surface_at(x, y), self.updates >= self.min_updates)
    }
}

/// Nearest-prototype clusterer that nudges the winner while learning.
#[derive(Clone, Debug, Default)]
pub struct NearestClusterer {
    pub prototypes: Vec<TimeSurface>,
    pub learning: bool,
    pub calls: usize,
    pub learned: usize,
}

impl Clusterer for NearestClusterer {
    fn cluster(&mut self, ts: &TimeSurface) -> Result<u16> {
        self.calls += 1;
        let (k, _) = self
            .prototypes
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.distance(ts)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or_else(|| HotsError::Config("clusterer has no prototypes".into()))?;

        if self.learning {
            self.prototypes[k].blend_toward(ts, 0.1);
            self.learned += 1;
        }
        Ok(k as u16)
    }

    fn set_prototypes(&mut self, prototypes: Vec<TimeSurface>) {
        self.prototypes = prototypes;
    }

    fn prototypes(&self) -> &[TimeSurface] {
        &self.prototypes
    }

    fn toggle_learning(&mut self, enabled: bool) -> bool {
        std::mem::replace(&mut self.learning, enabled)
    }

    fn is_learning(&self) -> bool {
        self.learning
    }
}

/// Call log shared between a [`ScriptedProcessor`] and the test body.
#[derive(Debug, Default)]
pub struct CallLog {
    pub resets: usize,
    pub processed: Events,
}

/// Emits `fanout` copies of each event with channels `0..fanout`, fails on
/// channel `poison` unless checks are skipped.
#[derive(Debug)]
pub struct ScriptedProcessor {
    pub fanout: u16,
    pub poison: Option<u16>,
    pub log: Rc<RefCell<CallLog>>,
}

impl ScriptedProcessor {
    pub fn new(fanout: u16) -> Self {
        Self {
            fanout,
            poison: None,
            log: Rc::default(),
        }
    }

    pub fn poisoned(mut self, channel: u16) -> Self {
        self.poison = Some(channel);
        self
    }
}

impl Processor for ScriptedProcessor {
    fn reset(&mut self) {
        self.log.borrow_mut().resets += 1;
    }

    fn process(&mut self, ev: &Event, skip_check: bool) -> Result<Events> {
        if !skip_check && Some(ev.p) == self.poison {
            return Err(HotsError::InvalidEvent(format!("poisoned channel {}", ev.p)));
        }
        self.log.borrow_mut().processed.push(*ev);
        Ok((0..self.fanout).map(|k| ev.with_channel(k)).collect())
    }
}
