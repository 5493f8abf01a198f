//! Running events through processors, and training networks
//!
//! ## Processing
//!
//! [`process`] resets a processor once and feeds it a sequence, collecting
//! everything it emits. [`process_batch`] does the same for each sequence of
//! a batch independently.
//!
//! ## Training
//!
//! [`train`] and [`train_batch`] fit a network one layer at a time:
//!
//! 1. sample the surfaces the layer computes on the initialization corpus
//! 2. build its codebook with the initializer and install it
//! 3. replay the whole corpus with learning on to refine the codebook
//! 4. the events the fitted layer emits become the next layer's corpus
//!
//! A layer never sees the output of an unfitted predecessor. Any failure
//! stops training; layers above the failing one are left untouched. A layer
//! that fails while replaying keeps the codebook installed in step 2, as far
//! as it was refined, with learning switched off again.

use crate::config::TrainConfig;
use crate::error::{HotsError, Result};
use crate::event::{Event, Events};
use crate::network::Network;
use crate::processor::{ClustererInitializer, Processor, TrainableLayer};

/// Reset `processor` and feed it `events`, returning all emitted events in
/// emission order.
pub fn process<P: Processor + ?Sized>(
    processor: &mut P,
    events: &[Event],
    skip_check: bool,
) -> Result<Events> {
    processor.reset();

    let mut out = Events::new();
    for ev in events {
        out.extend(processor.process(ev, skip_check)?);
    }
    Ok(out)
}

/// [`process`] each sequence independently, preserving batch order.
pub fn process_batch<P: Processor + ?Sized>(
    processor: &mut P,
    batch: &[Events],
    skip_check: bool,
) -> Result<Vec<Events>> {
    batch
        .iter()
        .map(|events| process(&mut *processor, events, skip_check))
        .collect()
}

/// Initialize and train every layer of `network` on one sequence.
///
/// `config.init_corpus` is ignored: the single sequence is both the
/// initialization and the training corpus.
///
/// On error, layers below the failing one stay fitted. The failing layer
/// keeps whatever codebook it had installed when the error occurred.
pub fn train<L, I>(
    network: &mut Network<L>,
    events: &[Event],
    initializer: &mut I,
    config: &TrainConfig,
) -> Result<()>
where
    L: TrainableLayer,
    I: ClustererInitializer + ?Sized,
{
    fit_layers(network, vec![events.to_vec()], &[0], initializer, config)
}

/// Initialize and train every layer of `network` on a batch of sequences.
///
/// Codebooks are initialized from the sequences `config.init_corpus`
/// selects; every sequence is replayed for training regardless. Failures
/// leave the network as [`train`] does.
pub fn train_batch<L, I>(
    network: &mut Network<L>,
    batch: &[Events],
    initializer: &mut I,
    config: &TrainConfig,
) -> Result<()>
where
    L: TrainableLayer,
    I: ClustererInitializer + ?Sized,
{
    let init = config.init_corpus.indices(batch.len())?;
    fit_layers(network, batch.to_vec(), &init, initializer, config)
}

fn fit_layers<L, I>(
    network: &mut Network<L>,
    mut corpus: Vec<Events>,
    init: &[usize],
    initializer: &mut I,
    config: &TrainConfig,
) -> Result<()>
where
    L: TrainableLayer,
    I: ClustererInitializer + ?Sized,
{
    let depth = network.len();
    for (i, layer) in network.layers_mut().iter_mut().enumerate() {
        log::info!(
            "[TRAIN] layer {}/{}: {} sequences, {} events",
            i + 1,
            depth,
            corpus.len(),
            corpus.iter().map(Vec::len).sum::<usize>()
        );

        corpus = fit_layer(layer, &corpus, init, initializer, config).map_err(|e| {
            log::warn!("[TRAIN] layer {}/{} failed: {}", i + 1, depth, e);
            HotsError::at_layer(i, e)
        })?;
    }
    Ok(())
}

/// Fit one layer and return what it emits for the next one.
fn fit_layer<L, I>(
    layer: &mut L,
    corpus: &[Events],
    init: &[usize],
    initializer: &mut I,
    config: &TrainConfig,
) -> Result<Vec<Events>>
where
    L: TrainableLayer + ?Sized,
    I: ClustererInitializer + ?Sized,
{
    let skip_check = config.skip_check;

    let mut surfaces = Vec::new();
    for &s in init {
        surfaces.extend(layer.sample_time_surfaces(&corpus[s], skip_check)?);
    }

    let prototypes = initializer.initialize(&surfaces)?;
    log::debug!(
        "[TRAIN] {} prototypes from {} surfaces",
        prototypes.len(),
        surfaces.len()
    );
    layer.set_prototypes(prototypes)?;

    layer.toggle_learning(true);
    let refined = process_batch(layer, corpus, skip_check);
    layer.toggle_learning(false);
    let refined = refined?;

    if config.frozen_emission {
        process_batch(layer, corpus, skip_check)
    } else {
        Ok(refined)
    }
}
