use log::debug;

use crate::approximator::QFunction;
use crate::error::{DqnError, Result};

/// Hard copy of the online parameters into the target every `interval` counted steps.
#[derive(Clone, Debug)]
pub struct TargetSynchronizer {
    interval: usize,
    steps_since_sync: usize,
    syncs: usize,
}

impl TargetSynchronizer {
    pub fn new(interval: usize) -> Result<Self> {
        if interval == 0 {
            return Err(DqnError::invalid_config("target_sync_interval", "must be positive"));
        }
        Ok(TargetSynchronizer { interval, steps_since_sync: 0, syncs: 0 })
    }

    pub fn interval(&self) -> usize {
        self.interval
    }

    pub fn steps_since_sync(&self) -> usize {
        self.steps_since_sync
    }

    /// Number of copies performed so far.
    pub fn syncs(&self) -> usize {
        self.syncs
    }

    /// Count one environment step and copy `online` into `target` once the count
    /// reaches the interval. Returns whether a copy happened.
    pub fn maybe_sync<Q: QFunction>(&mut self, online: &Q, target: &mut Q) -> Result<bool> {
        self.steps_since_sync += 1;
        if self.steps_since_sync < self.interval {
            return Ok(false);
        }
        target.set_parameters(&online.parameters())?;
        self.steps_since_sync = 0;
        self.syncs += 1;
        debug!("target synchronized (sync #{})", self.syncs);
        Ok(true)
    }
}
