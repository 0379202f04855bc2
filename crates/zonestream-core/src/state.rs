//! Per-mount payload store and fetch-cycle bookkeeping.
//!
//! Results are replaced wholesale each cycle. Cycles carry a generation
//! counter so that results from an in-flight batch that has since been
//! superseded (zone list changed, key changed) are discarded instead of
//! being mixed into the newer cycle's state: the last-started cycle wins.

use crate::delivery::FetchError;
use crate::surface::SlotState;

/// Handle for one fetch cycle; results settle against the generation that
/// started them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleToken {
    generation: u64,
}

impl CycleToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// In-memory slot states for one mounted widget.
#[derive(Debug, Default)]
pub struct AdState {
    slots: Vec<SlotState>,
    loading: bool,
    generation: u64,
}

impl AdState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[SlotState] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&SlotState> {
        self.slots.get(index)
    }

    /// True from `begin_cycle` until the matching `complete_cycle` applies.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_loaded()).count()
    }

    /// Start a new fetch cycle: every slot resets to `Loading` and any older
    /// in-flight cycle becomes stale.
    pub fn begin_cycle(&mut self, zone_count: usize) -> CycleToken {
        self.generation += 1;
        self.loading = true;
        self.slots = vec![SlotState::Loading; zone_count];
        log::debug!(
            "fetch cycle {} started for {} slot(s)",
            self.generation,
            zone_count
        );
        CycleToken {
            generation: self.generation,
        }
    }

    /// Apply a settled batch. Returns false (state untouched) when the token
    /// no longer matches the current generation.
    pub fn complete_cycle(
        &mut self,
        token: CycleToken,
        results: Vec<Result<String, FetchError>>,
    ) -> bool {
        if token.generation != self.generation {
            log::info!(
                "discarding stale fetch cycle {} (current is {})",
                token.generation,
                self.generation
            );
            return false;
        }
        debug_assert_eq!(results.len(), self.slots.len());
        self.slots = results
            .into_iter()
            .map(|r| match r {
                Ok(html) => SlotState::Loaded(html),
                Err(_) => SlotState::Failed,
            })
            .collect();
        self.loading = false;
        true
    }
}
