//! Request lifetimes bound to the controller that issued them.

use std::{
    collections::HashMap,
    future::Future,
    sync::{Mutex, MutexGuard, PoisonError},
};

use futures::future::{AbortHandle, Abortable};
use tracing::debug;

#[derive(Default)]
struct ScopeState {
    closed: bool,
    next_id: u64,
    in_flight: HashMap<u64, AbortHandle>,
}

impl ScopeState {
    fn abort_all(&mut self) {
        for (_, handle) in self.in_flight.drain() {
            handle.abort();
        }
    }
}

/// Tracks in-flight gateway calls so they can be aborted together.
///
/// Once closed, every pending call resolves to `None` at its next poll and
/// new calls resolve to `None` without being started.
#[derive(Default)]
pub struct RequestScope {
    inner: Mutex<ScopeState>,
}

impl RequestScope {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ScopeState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn run<F, T>(&self, future: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let (handle, registration) = AbortHandle::new_pair();
        let id = {
            let mut state = self.state();
            if state.closed {
                debug!("request scope closed; call not started");
                return None;
            }
            let id = state.next_id;
            state.next_id += 1;
            state.in_flight.insert(id, handle);
            id
        };
        let _entry = Entry { scope: self, id };

        match Abortable::new(future, registration).await {
            Ok(output) => Some(output),
            Err(_) => {
                debug!("request aborted by scope close");
                None
            }
        }
    }

    pub fn close(&self) {
        let mut state = self.state();
        state.closed = true;
        state.abort_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    pub fn in_flight(&self) -> usize {
        self.state().in_flight.len()
    }
}

/// Unregisters a call when it finishes or its future is dropped.
struct Entry<'a> {
    scope: &'a RequestScope,
    id: u64,
}

impl Drop for Entry<'_> {
    fn drop(&mut self) {
        self.scope.state().in_flight.remove(&self.id);
    }
}

#[cfg(test)]
#[path = "tests/scope_tests.rs"]
mod tests;
