//! Error types for event-hots

use thiserror::Error;

/// Error type for event processing and training.
#[derive(Debug, Error)]
pub enum HotsError {
    /// Event rejected by a processor (only raised when checks are enabled)
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Bad geometry, codebook or corpus selection
    #[error("Config error: {0}")]
    Config(String),

    /// Initializer could not build a codebook
    #[error("Initializer error: {0}")]
    Initializer(String),

    /// Failure while fitting a layer of a network
    #[error("Training failed at layer {layer}: {source}")]
    Training {
        layer: usize,
        #[source]
        source: Box<HotsError>,
    },
}

impl HotsError {
    /// Wrap an error raised while fitting `layer`.
    pub fn at_layer(layer: usize, source: HotsError) -> Self {
        HotsError::Training {
            layer,
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, HotsError>;
