use crate::world::{TraitAverages, World};

/// Population trait averages at one simulation step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraitSample {
    pub step: u64,
    pub averages: TraitAverages,
}

/// Full-run record of how the trait averages drift, for graphing
#[derive(Debug, Clone, Default)]
pub struct TraitHistory {
    samples: Vec<TraitSample>,
}

impl TraitHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample the world. Extinct worlds are skipped so the curves end where
    /// the population did.
    pub fn record(&mut self, world: &World) -> bool {
        if world.creatures().is_empty() {
            return false;
        }
        self.samples.push(TraitSample {
            step: world.tick(),
            averages: world.average_traits(),
        });
        true
    }

    pub fn samples(&self) -> &[TraitSample] {
        &self.samples
    }

    pub fn latest(&self) -> Option<&TraitSample> {
        self.samples.last()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
