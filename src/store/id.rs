use crate::model::RecipeId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

type Clock = Box<dyn Fn() -> u64 + Send + Sync>;

/// Hands out strictly increasing recipe ids based on a millisecond clock.
///
/// When the clock has not advanced since the last id (or went backwards),
/// the next id is `last + 1`.
pub(crate) struct IdGenerator {
    last: AtomicU64,
    clock: Clock,
}

impl IdGenerator {
    pub(crate) fn new() -> Self {
        Self::with_clock(system_millis)
    }

    pub(crate) fn with_clock(clock: impl Fn() -> u64 + Send + Sync + 'static) -> Self {
        IdGenerator {
            last: AtomicU64::new(0),
            clock: Box::new(clock),
        }
    }

    pub(crate) fn next(&self) -> RecipeId {
        let now = (self.clock)();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        RecipeId(now.max(previous.saturating_add(1)))
    }

    /// Makes sure future ids are greater than `id`.
    pub(crate) fn observe(&self, id: RecipeId) {
        self.last.fetch_max(id.0, Ordering::SeqCst);
    }
}

fn system_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
