//! Shared plumbing for screen view-models: environment access, spawned work
//! and teardown.

use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::environment::Environment;

pub struct ActivityViewModel {
    screen: &'static str,
    environment: Environment,
    scope: TaskScope,
}

impl ActivityViewModel {
    pub fn new(screen: &'static str, environment: Environment) -> Self {
        debug!(screen, "view-model created");
        Self {
            screen,
            environment,
            scope: TaskScope::default(),
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn scope(&self) -> &TaskScope {
        &self.scope
    }

    pub fn is_destroyed(&self) -> bool {
        self.scope.is_destroyed()
    }

    /// Cancels all spawned work. Returns false when already destroyed.
    pub fn destroy(&self) -> bool {
        let first = self.scope.destroy();
        if first {
            info!(screen = self.screen, "view-model destroyed");
        }
        first
    }
}

impl Drop for ActivityViewModel {
    fn drop(&mut self) {
        self.scope.destroy();
    }
}

#[derive(Default)]
struct SwitchSlot {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct ScopeState {
    destroyed: bool,
    slots: HashMap<&'static str, SwitchSlot>,
}

/// Owner of a view-model's asynchronous work.
///
/// Work is keyed; starting new work for a key aborts and invalidates the
/// previous work for that key.
#[derive(Clone, Default)]
pub struct TaskScope {
    state: Arc<Mutex<ScopeState>>,
}

impl TaskScope {
    fn lock(&self) -> MutexGuard<'_, ScopeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawns `task` as the latest work for `key`. Returns false when the
    /// scope is destroyed or no tokio runtime is available.
    pub fn switch<F, Fut>(&self, key: &'static str, task: F) -> bool
    where
        F: FnOnce(EmitGuard) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                warn!(key, error = %err, "no async runtime; dropping work");
                return false;
            }
        };

        let mut state = self.lock();
        if state.destroyed {
            return false;
        }
        let slot = state.slots.entry(key).or_default();
        slot.generation += 1;
        if let Some(previous) = slot.handle.take() {
            if !previous.is_finished() {
                debug!(key, generation = slot.generation, "superseding in-flight work");
            }
            previous.abort();
        }
        let guard = EmitGuard {
            scope: self.clone(),
            key,
            generation: slot.generation,
        };
        slot.handle = Some(runtime.spawn(task(guard)));
        true
    }

    /// Aborts and invalidates the work for `key` without starting new work.
    pub fn cancel(&self, key: &'static str) {
        let mut state = self.lock();
        let Some(slot) = state.slots.get_mut(key) else {
            return;
        };
        slot.generation += 1;
        if let Some(handle) = slot.handle.take() {
            if !handle.is_finished() {
                debug!(key, generation = slot.generation, "cancelling in-flight work");
            }
            handle.abort();
        }
    }

    pub fn is_in_flight(&self, key: &'static str) -> bool {
        self.lock()
            .slots
            .get(key)
            .and_then(|slot| slot.handle.as_ref())
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn is_destroyed(&self) -> bool {
        self.lock().destroyed
    }

    fn destroy(&self) -> bool {
        let mut state = self.lock();
        if state.destroyed {
            return false;
        }
        state.destroyed = true;
        for (key, slot) in state.slots.iter_mut() {
            if let Some(handle) = slot.handle.take() {
                if !handle.is_finished() {
                    debug!(key = *key, "cancelling in-flight work");
                }
                handle.abort();
            }
        }
        true
    }

    fn is_current(state: &ScopeState, key: &'static str, generation: u64) -> bool {
        !state.destroyed
            && state
                .slots
                .get(key)
                .is_some_and(|slot| slot.generation == generation)
    }
}

/// Handed to spawned work so it can only publish while it is still the
/// latest work for its key and the scope has not been destroyed.
pub struct EmitGuard {
    scope: TaskScope,
    key: &'static str,
    generation: u64,
}

impl EmitGuard {
    pub fn is_current(&self) -> bool {
        let state = self.scope.lock();
        TaskScope::is_current(&state, self.key, self.generation)
    }

    /// Runs `emit` while holding the scope lock, so teardown and newer work
    /// cannot interleave with the emission.
    pub fn emit_if_current(&self, emit: impl FnOnce()) -> bool {
        let state = self.scope.lock();
        if !TaskScope::is_current(&state, self.key, self.generation) {
            debug!(key = self.key, generation = self.generation, "dropping stale result");
            return false;
        }
        emit();
        true
    }
}

#[cfg(test)]
#[path = "tests/view_model_tests.rs"]
mod tests;
