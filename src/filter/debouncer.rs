use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::trace;

/// Cancel-and-replace delayed action.
///
/// Each [`schedule`](Debouncer::schedule) cancels whatever is pending and arms
/// a new timer on the tokio runtime. A cancelled or superseded action never
/// runs: the generation counter is checked under the same lock that
/// cancellation takes, so even a timer already woken on another worker thread
/// cannot fire once it has been replaced. Dropping the debouncer cancels it.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: Arc<Mutex<u64>>,
    pending: Option<JoinHandle<()>>,
}

fn lock(generation: &Mutex<u64>) -> MutexGuard<'_, u64> {
    generation.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            generation: Arc::new(Mutex::new(0)),
            pending: None,
        }
    }

    /// Run `action` once the delay elapses without another call.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let armed = self.bump_generation();
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }

        let generation = Arc::clone(&self.generation);
        let delay = self.delay;
        trace!(target: "debounce", "Armed generation {} for {:?}", armed, delay);

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let current = lock(&generation);
            if *current == armed {
                action();
            } else {
                trace!(target: "debounce", "Generation {} superseded by {}", armed, *current);
            }
        }));
    }

    /// Drop any pending action without running it
    pub fn cancel(&mut self) {
        self.bump_generation();
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Whether an action is armed and has not fired yet
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn bump_generation(&self) -> u64 {
        let mut current = lock(&self.generation);
        *current += 1;
        *current
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
