//! Geometry and training configuration

use crate::error::{HotsError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Geometry of a supercell partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellConfig {
    /// Width of the context.
    pub width: u16,

    /// Height of the context.
    pub height: u16,

    /// Side of the square cells.
    pub cell_size: u16,

    /// How much neighbouring cells overlap (0 = tiling).
    pub overlap: u16,
}

impl CellConfig {
    /// Create a non-overlapping configuration.
    pub fn new(width: u16, height: u16, cell_size: u16) -> Self {
        Self {
            width,
            height,
            cell_size,
            overlap: 0,
        }
    }

    pub fn with_overlap(mut self, overlap: u16) -> Self {
        self.overlap = overlap;
        self
    }

    /// Distance between the origins of two neighbouring cells.
    pub fn stride(&self) -> u16 {
        self.cell_size.saturating_sub(self.overlap)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(HotsError::Config(format!(
                "context must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if self.cell_size == 0 {
            return Err(HotsError::Config("cell size must be > 0".into()));
        }
        if self.overlap >= self.cell_size {
            return Err(HotsError::Config(format!(
                "overlap ({}) must be less than cell size ({})",
                self.overlap, self.cell_size
            )));
        }
        Ok(())
    }
}

/// Which sequences of a batch feed codebook initialization.
///
/// Replay always uses the whole batch; this only selects the corpus the
/// initializer sees.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InitCorpus {
    /// Every sequence of the batch.
    #[default]
    All,
    /// Only the first sequence.
    First,
    /// An explicit set of sequence indices.
    Sequences(Vec<usize>),
}

impl InitCorpus {
    /// Resolve to sequence indices for a batch of `len` sequences.
    pub fn indices(&self, len: usize) -> Result<Vec<usize>> {
        match self {
            InitCorpus::All => Ok((0..len).collect()),
            InitCorpus::First => Ok(if len > 0 { vec![0] } else { Vec::new() }),
            InitCorpus::Sequences(indices) => {
                if let Some(&bad) = indices.iter().find(|&&i| i >= len) {
                    return Err(HotsError::Config(format!(
                        "initialization sequence {} out of range for a batch of {}",
                        bad, len
                    )));
                }
                Ok(indices.clone())
            }
        }
    }
}

/// Options for layer-by-layer training.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrainConfig {
    /// Treat every event as valid.
    pub skip_check: bool,

    /// Sequences used to initialize codebooks (batch training only).
    pub init_corpus: InitCorpus,

    /// Emit the next layer's corpus from an extra pass with learning off.
    /// By default the events emitted while refining are used.
    pub frozen_emission: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            skip_check: false,
            init_corpus: InitCorpus::All,
            frozen_emission: false,
        }
    }
}

impl TrainConfig {
    /// Map the classic `use_all` flag: true uses every sequence for
    /// initialization, false only the first one.
    pub fn from_use_all(use_all: bool) -> Self {
        Self {
            init_corpus: if use_all {
                InitCorpus::All
            } else {
                InitCorpus::First
            },
            ..Self::default()
        }
    }

    pub fn with_skip_check(mut self, skip_check: bool) -> Self {
        self.skip_check = skip_check;
        self
    }

    pub fn with_init_corpus(mut self, init_corpus: InitCorpus) -> Self {
        self.init_corpus = init_corpus;
        self
    }

    pub fn with_frozen_emission(mut self, frozen_emission: bool) -> Self {
        self.frozen_emission = frozen_emission;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_config_validate() {
        assert!(CellConfig::new(10, 10, 5).validate().is_ok());
        assert!(CellConfig::new(10, 10, 5).with_overlap(4).validate().is_ok());
        assert!(CellConfig::new(0, 10, 5).validate().is_err());
        assert!(CellConfig::new(10, 10, 0).validate().is_err());
        assert!(CellConfig::new(10, 10, 5).with_overlap(5).validate().is_err());
    }

    #[test]
    fn test_init_corpus_indices() {
        assert_eq!(InitCorpus::All.indices(3).unwrap(), vec![0, 1, 2]);
        assert_eq!(InitCorpus::First.indices(3).unwrap(), vec![0]);
        assert!(InitCorpus::First.indices(0).unwrap().is_empty());
        assert_eq!(InitCorpus::Sequences(vec![2, 0]).indices(3).unwrap(), vec![2, 0]);
        assert!(InitCorpus::Sequences(vec![3]).indices(3).is_err());
    }

    #[test]
    fn test_from_use_all() {
        assert_eq!(TrainConfig::from_use_all(true).init_corpus, InitCorpus::All);
        assert_eq!(TrainConfig::from_use_all(false).init_corpus, InitCorpus::First);
        assert!(!TrainConfig::default().frozen_emission);
    }
}
