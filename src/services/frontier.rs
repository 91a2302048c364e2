use std::{
    collections::{HashSet, VecDeque},
    sync::Mutex,
};

use tokio::sync::Notify;

use crate::domain::request::Request;

#[derive(Default)]
struct FrontierState {
    queue: VecDeque<Request>,
    seen: HashSet<String>,
    in_flight: usize,
}

/// Shared URL queue. A URL is handed out at most once unless it is retried,
/// and the crawl is over once the queue is empty with nothing in flight.
#[derive(Default)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    notify: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, requests: impl IntoIterator<Item = Request>) -> usize {
        let mut added = 0;
        {
            let mut state = self.lock();
            for request in requests {
                if state.seen.insert(request.unique_key()) {
                    state.queue.push_back(request);
                    added += 1;
                }
            }
        }

        if added > 0 {
            self.notify.notify_waiters();
        }
        added
    }

    pub fn retry(&self, mut request: Request) {
        request.retry_count += 1;
        self.lock().queue.push_back(request);
        self.notify.notify_waiters();
    }

    /// Next request to handle, or `None` once the crawl is complete. Every
    /// request handed out must be followed by a call to `complete`, or be
    /// covered by an `InFlight` guard.
    pub async fn next(&self) -> Option<Request> {
        loop {
            let notified = self.notify.notified();
            {
                let mut state = self.lock();
                if let Some(request) = state.queue.pop_front() {
                    state.in_flight += 1;
                    return Some(request);
                }
                if state.in_flight == 0 {
                    drop(state);
                    self.notify.notify_waiters();
                    return None;
                }
            }
            notified.await;
        }
    }

    pub fn complete(&self) {
        {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        self.notify.notify_waiters();
    }

    pub fn in_flight(&self) -> InFlight<'_> {
        InFlight(self)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FrontierState> {
        // State stays consistent across a panicking holder, so recover it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Completes one handed-out request when dropped, unwinding included.
pub struct InFlight<'a>(&'a Frontier);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.complete();
    }
}
