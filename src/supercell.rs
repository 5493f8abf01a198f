//! Supercells - overlapping spatial partitions of a layer's output
//!
//! A supercell groups `K x K` pixels into one output coordinate, reducing
//! the output dimensionality of a layer. Neighbouring cells start every
//! `K - overlap` pixels, so with overlap > 0 a pixel belongs to several
//! cells and one incoming event fans out into several emitted events.
//!
//! ```text
//! K = 4, overlap = 2, stride = 2
//!
//! x:      0 1 2 3 4 5 6 7
//! cell 0: [-------)
//! cell 1:     [-------)
//! cell 2:         [-------)
//! ```

use std::ops::{Deref, Range};

use crate::config::CellConfig;
use crate::error::{HotsError, Result};
use crate::surface::TimeSurface;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Partition of a context into square, possibly overlapping cells.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SuperCell {
    config: CellConfig,

    /// Number of cells (horizontal).
    wcell: u16,

    /// Number of cells (vertical).
    hcell: u16,

    /// Max horizontal extent covered by cells.
    wmax: u16,

    /// Max vertical extent covered by cells.
    hmax: u16,
}

/// Cells needed along one axis so that `[0, extent)` is covered.
fn cells_along(extent: u16, k: u16, stride: u16) -> u16 {
    if extent <= k {
        return 1;
    }
    let (extent, k, stride) = (extent as u32, k as u32, stride as u32);
    ((extent - k + stride - 1) / stride + 1) as u16
}

/// Indices of the cells along one axis whose span contains `e`.
fn candidates(e: u16, k: u16, stride: u16, count: u16) -> Range<u16> {
    let (e32, k32, s32) = (e as u32, k as u32, stride as u32);
    let lo = if e32 + 1 > k32 {
        (e32 + 1 - k32 + s32 - 1) / s32
    } else {
        0
    };
    let hi = (e32 / s32).min(count as u32 - 1);
    if lo > hi {
        0..0
    } else {
        lo as u16..(hi + 1) as u16
    }
}

impl SuperCell {
    /// Create a partition of a `width x height` context into cells of side
    /// `k` overlapping by `overlap`.
    pub fn new(width: u16, height: u16, k: u16, overlap: u16) -> Result<Self> {
        Self::from_config(CellConfig::new(width, height, k).with_overlap(overlap))
    }

    pub fn from_config(config: CellConfig) -> Result<Self> {
        config.validate()?;

        let stride = config.stride();
        let wcell = cells_along(config.width, config.cell_size, stride);
        let hcell = cells_along(config.height, config.cell_size, stride);

        let extent = |cells: u16, limit: u16| {
            let full = (cells as u32 - 1) * stride as u32 + config.cell_size as u32;
            full.min(limit as u32) as u16
        };

        Ok(Self {
            config,
            wcell,
            hcell,
            wmax: extent(wcell, config.width),
            hmax: extent(hcell, config.height),
        })
    }

    pub fn config(&self) -> &CellConfig {
        &self.config
    }

    /// `(width, height)` of the context.
    pub fn size(&self) -> (u16, u16) {
        (self.config.width, self.config.height)
    }

    /// `(horizontal cells, vertical cells)`.
    pub fn cell_sizes(&self) -> (u16, u16) {
        (self.wcell, self.hcell)
    }

    /// Total number of cells in the grid.
    pub fn cell_count(&self) -> usize {
        self.wcell as usize * self.hcell as usize
    }

    pub fn cell_size(&self) -> u16 {
        self.config.cell_size
    }

    pub fn overlap(&self) -> u16 {
        self.config.overlap
    }

    /// `(max x, max y)` (exclusive) reached by any cell.
    pub fn max_extent(&self) -> (u16, u16) {
        (self.wmax, self.hmax)
    }

    /// Pixel span `[x0, x1) x [y0, y1)` of a cell, clipped to the context.
    pub fn cell_bounds(&self, cx: u16, cy: u16) -> (Range<u16>, Range<u16>) {
        let stride = self.config.stride() as u32;
        let k = self.config.cell_size as u32;
        let span = |c: u16, limit: u16| {
            let start = (c as u32 * stride).min(limit as u32);
            let end = (c as u32 * stride + k).min(limit as u32);
            start as u16..end as u16
        };
        (
            span(cx, self.config.width),
            span(cy, self.config.height),
        )
    }

    /// Center of a cell in event space.
    pub fn cell_center(&self, cx: u16, cy: u16) -> (u16, u16) {
        let (xs, ys) = self.cell_bounds(cx, cy);
        (
            xs.start + (xs.end - xs.start) / 2,
            ys.start + (ys.end - ys.start) / 2,
        )
    }

    /// Whether event coordinates fall in a cell. Lower edges are inclusive,
    /// upper edges exclusive.
    pub fn is_in_cell(&self, cx: u16, cy: u16, ex: u16, ey: u16) -> bool {
        if cx >= self.wcell || cy >= self.hcell {
            return false;
        }
        let (xs, ys) = self.cell_bounds(cx, cy);
        xs.contains(&ex) && ys.contains(&ey)
    }

    /// Cells containing `(ex, ey)`, row-major (cy outer, cx inner).
    ///
    /// More than one cell is returned only if overlap > 0; coordinates
    /// outside the context return none.
    pub fn find_cells(&self, ex: u16, ey: u16) -> Vec<(u16, u16)> {
        if ex >= self.wmax || ey >= self.hmax {
            return Vec::new();
        }

        let k = self.config.cell_size;
        let stride = self.config.stride();
        let xs = candidates(ex, k, stride, self.wcell);
        let ys = candidates(ey, k, stride, self.hcell);

        let mut cells = Vec::with_capacity(xs.len() * ys.len());
        for cy in ys {
            for cx in xs.clone() {
                if self.is_in_cell(cx, cy, ex, ey) {
                    cells.push((cx, cy));
                }
            }
        }
        cells
    }

    /// Flat index of a cell, `cy * wcell + cx`.
    #[inline]
    pub fn cell_index(&self, cx: u16, cy: u16) -> Option<usize> {
        if cx < self.wcell && cy < self.hcell {
            Some(cy as usize * self.wcell as usize + cx as usize)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct CellMem {
    ts: Option<TimeSurface>,
    count: u32,
}

/// Running average of time surfaces per supercell.
///
/// Wraps a [`SuperCell`] (partition queries are available through `Deref`)
/// and keeps one mean surface per cell.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SuperCellAverage {
    cells: SuperCell,
    mem: Vec<CellMem>,
}

impl SuperCellAverage {
    pub fn new(width: u16, height: u16, k: u16, overlap: u16) -> Result<Self> {
        Ok(Self::from_partition(SuperCell::new(width, height, k, overlap)?))
    }

    pub fn from_partition(cells: SuperCell) -> Self {
        let mem = vec![CellMem::default(); cells.cell_count()];
        Self { cells, mem }
    }

    pub fn partition(&self) -> &SuperCell {
        &self.cells
    }

    fn slot(&self, cx: u16, cy: u16) -> Result<usize> {
        self.cells.cell_index(cx, cy).ok_or_else(|| {
            let (w, h) = self.cells.cell_sizes();
            HotsError::InvalidEvent(format!(
                "cell ({}, {}) outside a {}x{} grid",
                cx, cy, w, h
            ))
        })
    }

    /// Fold a new surface into the mean of cell `(cx, cy)` and return it.
    ///
    /// The first surface becomes the mean; afterwards
    /// `avg += (ts - avg) / (count + 1)`.
    pub fn average_ts(&mut self, ts: &TimeSurface, cx: u16, cy: u16) -> Result<&TimeSurface> {
        let slot = self.slot(cx, cy)?;
        let cell = &mut self.mem[slot];

        if let Some(avg) = cell.ts.as_ref() {
            if !avg.same_shape(ts) {
                return Err(HotsError::Config(format!(
                    "cell ({}, {}) averages {:?} surfaces, got {:?}",
                    cx,
                    cy,
                    avg.shape(),
                    ts.shape()
                )));
            }
        }

        let count = cell.count;
        let avg = cell.ts.get_or_insert_with(|| ts.clone());
        if count > 0 {
            avg.blend_toward(ts, 1.0 / (count as f32 + 1.0));
        }
        cell.count = count + 1;

        Ok(&*avg)
    }

    /// Samples folded into a cell so far.
    pub fn count(&self, cx: u16, cy: u16) -> u32 {
        self.cells
            .cell_index(cx, cy)
            .map(|i| self.mem[i].count)
            .unwrap_or(0)
    }

    /// Current mean of a cell, if it has seen any surface.
    pub fn average(&self, cx: u16, cy: u16) -> Option<&TimeSurface> {
        self.cells
            .cell_index(cx, cy)
            .and_then(|i| self.mem[i].ts.as_ref())
    }

    /// Forget every cell's mean.
    pub fn clear(&mut self) {
        for cell in &mut self.mem {
            cell.ts = None;
            cell.count = 0;
        }
    }
}

impl Deref for SuperCellAverage {
    type Target = SuperCell;

    fn deref(&self) -> &SuperCell {
        &self.cells
    }
}
