use rand::{RngExt, rng};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of uniform picks for exercise, food and fallback-weather selection.
pub trait RandomSource: Send + Sync {
    /// Return an index in `0..len`. Callers never pass `len == 0`.
    fn index(&self, len: usize) -> usize;
}

/// Thread-local RNG from `rand`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index(&self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        let mut rng = rng();
        rng.random_range(0..len)
    }
}

/// Replays a fixed sequence of indices, cycling when exhausted. Each index is
/// clamped to the slice being picked from.
#[derive(Debug)]
pub struct ScriptedRandom {
    picks: Vec<usize>,
    cursor: AtomicUsize,
}

impl ScriptedRandom {
    pub fn new(picks: impl Into<Vec<usize>>) -> Self {
        Self {
            picks: picks.into(),
            cursor: AtomicUsize::new(0),
        }
    }

    /// Always pick `index`.
    pub fn always(index: usize) -> Self {
        Self::new(vec![index])
    }
}

impl RandomSource for ScriptedRandom {
    fn index(&self, len: usize) -> usize {
        if self.picks.is_empty() || len == 0 {
            return 0;
        }
        let at = self.cursor.fetch_add(1, Ordering::Relaxed) % self.picks.len();
        self.picks[at].min(len - 1)
    }
}

/// Uniformly pick one element of `items`.
pub fn pick<'a, T>(random: &dyn RandomSource, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(random.index(items.len()))
}
