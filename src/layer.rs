//! Layer - time surfaces in, cluster ids out
//!
//! A layer is assembled from a [`SurfaceKernel`] and a [`Clusterer`]. Each
//! incoming event updates the kernel; the surface around the event (or
//! around the centers of the supercells containing it) is classified and
//! one event per classification is emitted, optionally remapped.

use crate::error::{HotsError, Result};
use crate::event::{Event, Events};
use crate::processor::{Classifier, Clusterer, Processor, SurfaceKernel, TimeSurfacePool};
use crate::remap::Remapper;
use crate::supercell::{SuperCell, SuperCellAverage};
use crate::surface::TimeSurface;

/// How a layer pools its output space.
#[derive(Clone, Debug, Default)]
pub enum Pooling {
    /// One output event per input event, at the input coordinates.
    #[default]
    None,
    /// One output event per containing supercell, at cell coordinates.
    Cells(SuperCell),
    /// As `Cells`, classifying the per-cell running mean surface.
    Average(SuperCellAverage),
}

impl Pooling {
    fn partition(&self) -> Option<&SuperCell> {
        match self {
            Pooling::None => None,
            Pooling::Cells(sc) => Some(sc),
            Pooling::Average(avg) => Some(avg.partition()),
        }
    }
}

/// A HOTS layer over a kernel `K` and a clusterer `C`.
#[derive(Clone, Debug)]
pub struct Layer<K, C> {
    kernel: K,
    clusterer: C,
    width: u16,
    height: u16,
    remapper: Option<Remapper>,
    pooling: Pooling,
    last_t: Option<u64>,
}

impl<K: SurfaceKernel, C: Clusterer> Layer<K, C> {
    /// Create a layer over a `width x height` context.
    pub fn new(kernel: K, clusterer: C, width: u16, height: u16) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(HotsError::Config(format!(
                "layer context must be non-empty, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            kernel,
            clusterer,
            width,
            height,
            remapper: None,
            pooling: Pooling::None,
            last_t: None,
        })
    }

    pub fn with_remapper(mut self, remapper: impl Into<Remapper>) -> Self {
        self.remapper = Some(remapper.into());
        self
    }

    /// Pool the output over supercells. The partition must span the layer's context.
    pub fn with_supercell(self, cells: SuperCell) -> Result<Self> {
        self.with_pooling(Pooling::Cells(cells))
    }

    /// Pool the output over supercells, classifying per-cell mean surfaces.
    pub fn with_supercell_average(self, cells: SuperCellAverage) -> Result<Self> {
        self.with_pooling(Pooling::Average(cells))
    }

    pub fn with_pooling(mut self, pooling: Pooling) -> Result<Self> {
        if let Some(sc) = pooling.partition() {
            if sc.size() != self.context() {
                return Err(HotsError::Config(format!(
                    "supercells span {:?}, layer context is {:?}",
                    sc.size(),
                    self.context()
                )));
            }
        }
        self.pooling = pooling;
        Ok(self)
    }

    /// `(width, height)` of the input context.
    pub fn context(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn clusterer(&self) -> &C {
        &self.clusterer
    }

    pub fn remapper(&self) -> Option<&Remapper> {
        self.remapper.as_ref()
    }

    pub fn pooling(&self) -> &Pooling {
        &self.pooling
    }

    /// Reject out-of-context or non-causal events.
    fn admit(&mut self, ev: &Event, skip_check: bool) -> Result<()> {
        if !skip_check {
            if ev.x >= self.width || ev.y >= self.height {
                return Err(HotsError::InvalidEvent(format!(
                    "({}, {}) outside a {}x{} context",
                    ev.x, ev.y, self.width, self.height
                )));
            }
            if let Some(last) = self.last_t {
                if ev.t < last {
                    return Err(HotsError::InvalidEvent(format!(
                        "timestamp {} earlier than previous {}",
                        ev.t, last
                    )));
                }
            }
        }
        self.last_t = Some(self.last_t.map_or(ev.t, |last| last.max(ev.t)));
        Ok(())
    }
}

/// Feed every surface worth classifying for `ev` into `sink`, together
/// with the coordinates of the event it would produce.
fn each_surface<K, F>(
    kernel: &K,
    pooling: &mut Pooling,
    ev: &Event,
    skip_check: bool,
    mut sink: F,
) -> Result<()>
where
    K: SurfaceKernel,
    F: FnMut(u16, u16, &TimeSurface) -> Result<()>,
{
    match pooling {
        Pooling::None => {
            let (ts, good) = kernel.compute(ev.t, ev.x, ev.y, ev.p);
            if good || skip_check {
                sink(ev.x, ev.y, &ts)?;
            }
        }
        Pooling::Cells(sc) => {
            for (cx, cy) in sc.find_cells(ev.x, ev.y) {
                let (x, y) = sc.cell_center(cx, cy);
                let (ts, good) = kernel.compute(ev.t, x, y, ev.p);
                if good || skip_check {
                    sink(cx, cy, &ts)?;
                }
            }
        }
        Pooling::Average(avg) => {
            for (cx, cy) in avg.find_cells(ev.x, ev.y) {
                let (x, y) = avg.cell_center(cx, cy);
                let (ts, good) = kernel.compute(ev.t, x, y, ev.p);
                if good || skip_check {
                    sink(cx, cy, avg.average_ts(&ts, cx, cy)?)?;
                }
            }
        }
    }
    Ok(())
}

impl<K: SurfaceKernel, C: Clusterer> Processor for Layer<K, C> {
    /// Resets the kernel and forgets supercell averages.
    fn reset(&mut self) {
        self.kernel.reset();
        self.last_t = None;
        if let Pooling::Average(avg) = &mut self.pooling {
            avg.clear();
        }
    }

    fn process(&mut self, ev: &Event, skip_check: bool) -> Result<Events> {
        self.admit(ev, skip_check)?;
        self.kernel.update(ev);

        let Self {
            kernel,
            clusterer,
            remapper,
            pooling,
            ..
        } = self;

        let mut out = Events::new();
        each_surface(kernel, pooling, ev, skip_check, |x, y, ts| {
            let k = clusterer.cluster(ts)?;
            let emitted = Event::new(ev.t, x, y, k);
            out.push(match remapper.as_ref() {
                Some(r) => r.try_remap_event(emitted, k)?,
                None => emitted,
            });
            Ok(())
        })?;

        Ok(out)
    }
}

impl<K: SurfaceKernel, C: Clusterer> Classifier for Layer<K, C> {
    fn set_prototypes(&mut self, prototypes: Vec<TimeSurface>) -> Result<()> {
        let Some(first) = prototypes.first() else {
            return Err(HotsError::Config("codebook must not be empty".into()));
        };
        if let Some(odd) = prototypes.iter().find(|p| !p.same_shape(first)) {
            return Err(HotsError::Config(format!(
                "codebook mixes {:?} and {:?} prototypes",
                first.shape(),
                odd.shape()
            )));
        }
        self.clusterer.set_prototypes(prototypes);
        Ok(())
    }

    fn prototypes(&self) -> &[TimeSurface] {
        self.clusterer.prototypes()
    }

    fn toggle_learning(&mut self, enabled: bool) -> bool {
        self.clusterer.toggle_learning(enabled)
    }
}

impl<K: SurfaceKernel, C: Clusterer> TimeSurfacePool for Layer<K, C> {
    fn sample_time_surfaces(
        &mut self,
        events: &[Event],
        skip_check: bool,
    ) -> Result<Vec<TimeSurface>> {
        Processor::reset(self);

        let mut surfaces = Vec::new();
        for ev in events {
            self.admit(ev, skip_check)?;
            self.kernel.update(ev);
            each_surface(&self.kernel, &mut self.pooling, ev, skip_check, |_, _, ts| {
                surfaces.push(ts.clone());
                Ok(())
            })?;
        }
        Ok(surfaces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remap::{ArrayLayer, SerializingLayer};
    use crate::testing::{surface_at, NearestClusterer, PositionKernel};

    fn layer(width: u16, height: u16) -> Layer<PositionKernel, NearestClusterer> {
        let mut layer = Layer::new(PositionKernel::default(), NearestClusterer::default(), width, height)
            .unwrap();
        layer
            .set_prototypes(vec![surface_at(0, 0), surface_at(9, 9)])
            .unwrap();
        layer
    }

    #[test]
    fn test_emits_cluster_id_at_event_position() {
        let mut l = layer(10, 10);
        let out = l.process(&Event::new(5, 1, 2, 1), false).unwrap();
        assert_eq!(out, vec![Event::new(5, 1, 2, 0)]);

        let out = l.process(&Event::new(6, 8, 7, 0), false).unwrap();
        assert_eq!(out, vec![Event::new(6, 8, 7, 1)]);
    }

    #[test]
    fn test_invalid_events() {
        let mut l = layer(10, 10);
        assert!(matches!(
            l.process(&Event::new(0, 10, 0, 0), false),
            Err(HotsError::InvalidEvent(_))
        ));

        l.process(&Event::new(50, 0, 0, 0), false).unwrap();
        assert!(matches!(
            l.process(&Event::new(40, 0, 0, 0), false),
            Err(HotsError::InvalidEvent(_))
        ));
        assert_eq!(l.process(&Event::new(40, 0, 0, 0), true).unwrap().len(), 1);

        l.reset();
        assert!(l.process(&Event::new(1, 0, 0, 0), false).is_ok());
    }

    #[test]
    fn test_weak_surfaces_dropped_unless_skip_check() {
        let kernel = PositionKernel {
            min_updates: 3,
            ..Default::default()
        };
        let mut l = Layer::new(kernel, NearestClusterer::default(), 10, 10).unwrap();
        l.set_prototypes(vec![surface_at(0, 0)]).unwrap();

        assert!(l.process(&Event::new(0, 1, 1, 0), false).unwrap().is_empty());
        assert_eq!(l.process(&Event::new(1, 1, 1, 0), true).unwrap().len(), 1);
        assert_eq!(l.process(&Event::new(2, 1, 1, 0), false).unwrap().len(), 1);
    }

    #[test]
    fn test_remappers() {
        let mut l = layer(10, 10).with_remapper(ArrayLayer);
        let out = l.process(&Event::new(3, 8, 7, 0), false).unwrap();
        assert_eq!(out, vec![Event::new(3, 1, 7, 0)]);

        let mut l = layer(10, 10).with_remapper(SerializingLayer::new(10, 10).unwrap());
        let out = l.process(&Event::new(3, 8, 7, 0), false).unwrap();
        assert_eq!(out, vec![Event::new(3, 100 + 70 + 8, 0, 0)]);
    }

    #[test]
    fn test_serializing_overflow_is_an_error() {
        let mut l = Layer::new(PositionKernel::default(), NearestClusterer::default(), 256, 256)
            .unwrap()
            .with_remapper(SerializingLayer::new(256, 256).unwrap());
        l.set_prototypes(vec![surface_at(0, 0), surface_at(255, 255)])
            .unwrap();

        let out = l.process(&Event::new(0, 1, 1, 0), false).unwrap();
        assert_eq!(out, vec![Event::new(0, 257, 0, 0)]);

        // Cluster 1 needs index 65536 + 250 * 256 + 250.
        assert!(matches!(
            l.process(&Event::new(1, 250, 250, 0), false),
            Err(HotsError::InvalidEvent(_))
        ));
    }

    #[test]
    fn test_supercell_fan_out() {
        let cells = SuperCell::new(10, 10, 4, 2).unwrap();
        let expected = cells.find_cells(5, 3);
        assert_eq!(expected.len(), 4);

        let mut l = layer(10, 10).with_supercell(cells).unwrap();
        let out = l.process(&Event::new(7, 5, 3, 0), false).unwrap();

        let coords: Vec<(u16, u16)> = out.iter().map(|e| (e.x, e.y)).collect();
        assert_eq!(coords, expected);
        assert!(out.iter().all(|e| e.t == 7));
    }

    #[test]
    fn test_supercell_classifies_cell_center() {
        let mut l = layer(10, 10)
            .with_supercell(SuperCell::new(10, 10, 5, 0).unwrap())
            .unwrap();
        // Center of cell (1, 1) is (7, 7), nearest to the (9, 9) prototype.
        let out = l.process(&Event::new(0, 5, 5, 0), false).unwrap();
        assert_eq!(out, vec![Event::new(0, 1, 1, 1)]);
    }

    #[test]
    fn test_supercell_size_must_match() {
        let cells = SuperCell::new(8, 8, 4, 0).unwrap();
        assert!(layer(10, 10).with_supercell(cells).is_err());
    }

    #[test]
    fn test_average_cleared_on_reset() {
        let avg = SuperCellAverage::new(10, 10, 5, 0).unwrap();
        let mut l = layer(10, 10).with_supercell_average(avg).unwrap();

        l.process(&Event::new(0, 1, 1, 0), false).unwrap();
        l.process(&Event::new(1, 2, 2, 0), false).unwrap();
        match l.pooling() {
            Pooling::Average(avg) => assert_eq!(avg.count(0, 0), 2),
            _ => unreachable!(),
        }

        l.reset();
        match l.pooling() {
            Pooling::Average(avg) => assert_eq!(avg.count(0, 0), 0),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_sample_time_surfaces_does_not_classify() {
        let mut l = layer(10, 10);
        l.toggle_learning(true);
        let events = vec![Event::new(0, 1, 1, 0), Event::new(1, 8, 8, 0)];

        let surfaces = l.sample_time_surfaces(&events, false).unwrap();
        assert_eq!(surfaces, vec![surface_at(1, 1), surface_at(8, 8)]);
        assert_eq!(l.clusterer().calls, 0);
        assert_eq!(l.kernel().resets, 1);
    }

    #[test]
    fn test_set_prototypes_validation() {
        let mut l = layer(10, 10);
        assert!(l.set_prototypes(Vec::new()).is_err());
        assert!(l
            .set_prototypes(vec![surface_at(0, 0), TimeSurface::zeros(3, 3)])
            .is_err());
        assert_eq!(l.prototypes().len(), 2);
        assert!(l.is_initialized());
    }
}
