//! Ordered mirror list with retry-with-fallback
//!
//! Several providers are only reachable through unofficial mirrors that come
//! and go. A [`MirrorSet`] holds the candidates in a fixed order (optionally
//! shuffled once with a seed) and [`MirrorSet::try_each`] walks them until
//! one answers. The walk starts at a rotating cursor: a mirror that answers
//! keeps the cursor, a mirror that fails or is abandoned mid-request moves it
//! to the next one.
//!
//! One walk is bounded by the set's budget. Each attempt gets an equal share
//! of what is left, so a slow mirror cannot eat the time of the ones after it.

use crate::error::{Result, SourceError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::{Instant, timeout};
use tracing::{debug, warn};

/// Time allowed for one walk over the mirrors
pub const DEFAULT_MIRROR_BUDGET: Duration = Duration::from_secs(7);

#[derive(Debug, Default, Clone, Copy)]
struct Cursor {
    start: usize,
    /// The mirror at `start` answered the last attempt made on it
    confirmed: bool,
}

#[derive(Debug)]
pub struct MirrorSet {
    name: String,
    mirrors: Vec<String>,
    budget: Duration,
    cursor: Mutex<Cursor>,
}

/// Moves the cursor past `idx` unless the attempt is settled
///
/// Dropping the guard covers both an error and a caller abandoning the
/// attempt under its own timeout.
struct InFlight<'a> {
    set: &'a MirrorSet,
    idx: usize,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.set.skip(self.idx);
        }
    }
}

impl MirrorSet {
    /// Keeps the configured order
    pub fn new(name: impl Into<String>, mirrors: Vec<String>) -> Self {
        let mirrors = mirrors
            .into_iter()
            .map(|m| m.trim().trim_end_matches('/').to_string())
            .filter(|m| !m.is_empty())
            .collect();
        Self {
            name: name.into(),
            mirrors,
            budget: DEFAULT_MIRROR_BUDGET,
            cursor: Mutex::new(Cursor::default()),
        }
    }

    /// Shuffles the candidates once, deterministically for a given seed
    pub fn shuffled(name: impl Into<String>, mirrors: Vec<String>, seed: u64) -> Self {
        let mut set = Self::new(name, mirrors);
        let mut rng = StdRng::seed_from_u64(seed);
        set.mirrors.shuffle(&mut rng);
        set
    }

    /// Shuffles with a seed drawn from the thread rng
    pub fn randomized(name: impl Into<String>, mirrors: Vec<String>) -> Self {
        let seed = rand::rng().random::<u64>();
        Self::shuffled(name, mirrors, seed)
    }

    /// Bounds one [`MirrorSet::try_each`] walk to `budget`
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn len(&self) -> usize {
        self.mirrors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mirrors.is_empty()
    }

    fn cursor(&self) -> Cursor {
        *self.cursor.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Mirror indices in the order they will be tried
    fn order(&self) -> Vec<usize> {
        let n = self.mirrors.len();
        let start = self.cursor().start;
        (0..n).map(|k| (start + k) % n).collect()
    }

    /// Candidates in the order they will be tried
    pub fn candidates(&self) -> Vec<String> {
        self.order()
            .into_iter()
            .map(|idx| self.mirrors[idx].clone())
            .collect()
    }

    /// The mirror that answered last, if it has not failed since
    pub fn preferred(&self) -> Option<String> {
        let cursor = self.cursor();
        cursor
            .confirmed
            .then(|| self.mirrors.get(cursor.start).cloned())
            .flatten()
    }

    /// Forgets the preferred mirror
    ///
    /// The rotation position is kept, so the next walk does not go back to
    /// a mirror that already failed.
    pub fn reset(&self) {
        self.cursor.lock().unwrap_or_else(|e| e.into_inner()).confirmed = false;
    }

    fn settle(&self, idx: usize) {
        *self.cursor.lock().unwrap_or_else(|e| e.into_inner()) = Cursor {
            start: idx,
            confirmed: true,
        };
    }

    /// Moves the cursor past `idx` if it still points there
    fn skip(&self, idx: usize) {
        let mut cursor = self.cursor.lock().unwrap_or_else(|e| e.into_inner());
        if cursor.start == idx && !self.mirrors.is_empty() {
            *cursor = Cursor {
                start: (idx + 1) % self.mirrors.len(),
                confirmed: false,
            };
        }
    }

    /// Calls `attempt` with each mirror base URL until one succeeds
    ///
    /// `attempt` also receives the time it is allowed; the call is cut off
    /// past it. Returns [`SourceError::AllMirrorsFailed`] when every
    /// candidate failed or when the set is empty.
    pub async fn try_each<T, F, Fut>(&self, mut attempt: F) -> Result<T>
    where
        F: FnMut(String, Duration) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let deadline = Instant::now() + self.budget;
        let order = self.order();
        let total = order.len();
        let mut tried = 0;
        let mut last = String::from("no mirror configured");

        for (k, idx) in order.into_iter().enumerate() {
            let mirror = self.mirrors[idx].clone();
            let share = deadline.saturating_duration_since(Instant::now()) / (total - k) as u32;
            tried += 1;

            let mut guard = InFlight {
                set: self,
                idx,
                settled: false,
            };
            let outcome = match timeout(share, attempt(mirror.clone(), share)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(SourceError::Timeout),
            };
            match outcome {
                Ok(value) => {
                    guard.settled = true;
                    self.settle(idx);
                    debug!(source = %self.name, mirror = %mirror, "Mirror answered");
                    return Ok(value);
                }
                Err(e) => {
                    debug!(
                        source = %self.name,
                        mirror = %mirror,
                        share_ms = share.as_millis() as u64,
                        error = %e,
                        "Mirror failed"
                    );
                    last = e.to_string();
                }
            }
        }

        warn!(source = %self.name, tried, last = %last, "All mirrors failed");
        Err(SourceError::AllMirrorsFailed { tried, last })
    }

    /// Like [`MirrorSet::try_each`], but an empty answer counts as a miss
    ///
    /// When every mirror answered but all answers were empty the result is an
    /// empty list rather than an error.
    pub async fn try_each_non_empty<T, F, Fut>(&self, mut attempt: F) -> Result<Vec<T>>
    where
        F: FnMut(String, Duration) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        let empty_answers = AtomicUsize::new(0);
        let empties = &empty_answers;

        let result = self
            .try_each(move |mirror, share| {
                let answer = attempt(mirror, share);
                async move {
                    let items = answer.await?;
                    if items.is_empty() {
                        empties.fetch_add(1, Ordering::Relaxed);
                        Err(SourceError::Unavailable("empty answer".to_string()))
                    } else {
                        Ok(items)
                    }
                }
            })
            .await;

        match result {
            Err(SourceError::AllMirrorsFailed { tried, .. })
                if tried > 0 && empty_answers.load(Ordering::Relaxed) == tried =>
            {
                Ok(Vec::new())
            }
            other => other,
        }
    }
}
