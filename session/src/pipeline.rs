use std::time::Duration;

use dot_merge_system_resolution::MergeDot;

/// Deferred stage of a resolution that already cleared its path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Stage {
    Collapse,
    Refill,
}

/// Single in-flight resolution waiting on its settle and refill delays.
#[derive(Debug)]
pub(crate) struct ResolutionPipeline {
    next: Stage,
    wait: Duration,
    refill_delay: Duration,
    merge: Option<MergeDot>,
}

impl ResolutionPipeline {
    /// Schedules the collapse after `settle_delay` and the refill
    /// `refill_delay` after that. `merge` is a dot still owed to the grid.
    pub(crate) fn new(
        settle_delay: Duration,
        refill_delay: Duration,
        merge: Option<MergeDot>,
    ) -> Self {
        Self {
            next: Stage::Collapse,
            wait: settle_delay,
            refill_delay,
            merge,
        }
    }

    /// Spends `budget` on the pending delay and returns the stage that became
    /// due, if any. Whatever is left of the budget stays in `budget`.
    pub(crate) fn consume(&mut self, budget: &mut Duration) -> Option<Stage> {
        if *budget < self.wait {
            self.wait -= *budget;
            *budget = Duration::ZERO;
            return None;
        }

        *budget -= self.wait;
        let due = self.next;
        self.next = Stage::Refill;
        self.wait = self.refill_delay;
        Some(due)
    }

    pub(crate) fn into_merge(self) -> Option<MergeDot> {
        self.merge
    }
}
