//! Event HOTS - hierarchy of time surfaces for event-based vision
//!
//! Event cameras do not send frames - every pixel fires on its own.
//!
//! # Core Types
//!
//! - **Event**: `(t, x, y, p)`, polarity on input, cluster id once processed
//! - **Layer**: time surface per event, nearest prototype, one event out
//! - **Network**: layers stacked, each consuming the previous one's output
//!
//! # Architecture: Driver / Layers / Trainer
//!
//! 1. **Driver** - [`process`] resets a [`Processor`] and feeds it a sequence
//! 2. **Layers** - anything implementing [`Processor`]; a [`Layer`] is built
//!    from a [`SurfaceKernel`] and a [`Clusterer`]
//! 3. **Trainer** - [`train`] fits codebooks one layer at a time, each layer
//!    learning from the output of the already fitted ones
//!
//! # Output Shaping
//!
//! - **Remappers**: [`ArrayLayer`] emits `{t, k, y, 0}`, [`SerializingLayer`]
//!   flattens `(x, y, k)` into one index
//! - **Supercells**: [`SuperCell`] pools `K x K` pixels into one output
//!   coordinate; overlapping cells make one event fan out into several
//! - **Averaging**: [`SuperCellAverage`] classifies the running mean surface
//!   of each cell instead of the raw one
//!
//! # Example: Output Geometry
//!
//! ```rust
//! use event_hots::{Event, EventRemapper, SerializingLayer, SuperCell};
//!
//! // 10x10 context, 5x5 cells, no overlap: a 2x2 grid
//! let cells = SuperCell::new(10, 10, 5, 0).unwrap();
//! assert_eq!(cells.cell_sizes(), (2, 2));
//! assert_eq!(cells.find_cells(7, 7), vec![(1, 1)]);
//!
//! // Overlapping cells: one pixel, several cells
//! let overlapping = SuperCell::new(10, 10, 4, 2).unwrap();
//! assert_eq!(overlapping.find_cells(5, 3).len(), 4);
//!
//! // Cluster 5 at (2, 1) in a 4x3 context becomes index 4*3*5 + 4*1 + 2
//! let serial = SerializingLayer::new(4, 3).unwrap();
//! let out = serial.remap_event(Event::new(10, 2, 1, 0), 5);
//! assert_eq!(out, Event::new(10, 66, 0, 0));
//! ```
//!
//! # Training
//!
//! ```rust,ignore
//! let mut network = Network::new(vec![layer1, layer2]);
//! let mut init = UniformInitializer::new(8, 42);
//! train(&mut network, &events, &mut init, &TrainConfig::default())?;
//! let features = process(&mut network, &test_events, false)?;
//! ```

mod config;
mod error;
mod event;
mod initializer;
mod layer;
mod network;
mod processor;
mod remap;
mod run;
mod supercell;
mod surface;

#[cfg(test)]
mod testing;

pub use config::{CellConfig, InitCorpus, TrainConfig};
pub use error::{HotsError, Result};
pub use event::{is_chronological, Event, Events};
pub use initializer::UniformInitializer;
pub use layer::{Layer, Pooling};
pub use network::Network;
pub use processor::{
    Classifier, Clusterer, ClustererInitializer, Processor, SurfaceKernel, TimeSurfacePool,
    TrainableLayer,
};
pub use remap::{ArrayLayer, EventRemapper, Remapper, SerializingLayer};
pub use run::{process, process_batch, train, train_batch};
pub use supercell::{SuperCell, SuperCellAverage};
pub use surface::TimeSurface;
