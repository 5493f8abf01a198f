//! Network - an ordered stack of processors
//!
//! Each event emitted by layer `i` is fed to layer `i + 1` in emission
//! order; the network emits what the last layer emits.

use std::ops::{Index, IndexMut};

use crate::error::Result;
use crate::event::{Event, Events};
use crate::processor::Processor;

#[derive(Clone, Debug)]
pub struct Network<L> {
    layers: Vec<L>,
}

impl<L> Default for Network<L> {
    fn default() -> Self {
        Self { layers: Vec::new() }
    }
}

impl<L> Network<L> {
    pub fn new(layers: Vec<L>) -> Self {
        Self { layers }
    }

    /// Append a layer on top of the stack.
    pub fn push(&mut self, layer: L) {
        self.layers.push(layer);
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layers(&self) -> &[L] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [L] {
        &mut self.layers
    }
}

impl<L> FromIterator<L> for Network<L> {
    fn from_iter<I: IntoIterator<Item = L>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<L> Index<usize> for Network<L> {
    type Output = L;

    fn index(&self, i: usize) -> &L {
        &self.layers[i]
    }
}

impl<L> IndexMut<usize> for Network<L> {
    fn index_mut(&mut self, i: usize) -> &mut L {
        &mut self.layers[i]
    }
}

impl<L: Processor> Processor for Network<L> {
    fn reset(&mut self) {
        for layer in &mut self.layers {
            layer.reset();
        }
    }

    fn process(&mut self, ev: &Event, skip_check: bool) -> Result<Events> {
        let mut current = vec![*ev];
        for layer in &mut self.layers {
            let mut next = Events::new();
            for e in &current {
                next.extend(layer.process(e, skip_check)?);
            }
            if next.is_empty() {
                return Ok(next);
            }
            current = next;
        }
        Ok(current)
    }
}
