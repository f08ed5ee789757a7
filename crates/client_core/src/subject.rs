//! Push-based subjects backing every view-model input and output.
//!
//! A [`Subject`] keeps a registry of observers and pushes each value to all of
//! them synchronously, in call order. Replay-latest subjects also hand the most
//! recent value to observers that subscribe late.

use std::{
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    task::{Context, Poll},
};

use futures::Stream;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_stream::wrappers::UnboundedReceiverStream;

struct SubjectState<T> {
    latest: Option<T>,
    observers: Vec<UnboundedSender<T>>,
    completed: bool,
}

pub struct Subject<T> {
    state: Arc<Mutex<SubjectState<T>>>,
    replay_latest: bool,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            replay_latest: self.replay_latest,
        }
    }
}

impl<T: Clone + Send + 'static> Subject<T> {
    /// Subject that replays its most recent value to new observers.
    pub fn replay_latest() -> Self {
        Self::with_replay(true)
    }

    /// Subject that only delivers values pushed after an observer attached.
    pub fn publish() -> Self {
        Self::with_replay(false)
    }

    fn with_replay(replay_latest: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(SubjectState {
                latest: None,
                observers: Vec::new(),
                completed: false,
            })),
            replay_latest,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SubjectState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn on_next(&self, value: T) {
        let mut state = self.lock();
        if state.completed {
            return;
        }
        state
            .observers
            .retain(|observer| observer.send(value.clone()).is_ok());
        if self.replay_latest {
            state.latest = Some(value);
        }
    }

    /// Ends every observer's stream. Later values are ignored.
    pub fn on_completed(&self) {
        let mut state = self.lock();
        state.completed = true;
        state.observers.clear();
    }

    /// Attaches a new observer.
    ///
    /// Each observer buffers undelivered values without bound until it reads
    /// them or is dropped, so screens must drain or drop what they subscribe.
    pub fn subscribe(&self) -> Observer<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.lock();
        if !state.completed {
            if let Some(latest) = state.latest.as_ref() {
                let _ = tx.send(latest.clone());
            }
            state.observers.push(tx);
        }
        Observer {
            inner: UnboundedReceiverStream::new(rx),
        }
    }

    /// Most recent value, if this subject replays and has seen one.
    #[cfg(test)]
    pub(crate) fn value(&self) -> Option<T> {
        self.lock().latest.clone()
    }

    #[cfg(test)]
    pub(crate) fn observer_count(&self) -> usize {
        let mut state = self.lock();
        state.observers.retain(|observer| !observer.is_closed());
        state.observers.len()
    }
}

/// Receiving end of a subscription.
pub struct Observer<T> {
    inner: UnboundedReceiverStream<T>,
}

impl<T> Observer<T> {
    fn receiver(&mut self) -> &mut UnboundedReceiver<T> {
        AsMut::as_mut(&mut self.inner)
    }

    /// Next buffered value without waiting.
    pub fn try_next_value(&mut self) -> Option<T> {
        self.receiver().try_recv().ok()
    }

    /// Drains every buffered value.
    pub fn values(&mut self) -> Vec<T> {
        let mut values = Vec::new();
        while let Some(value) = self.try_next_value() {
            values.push(value);
        }
        values
    }

    /// True once the subject has completed and every buffered value was read.
    #[cfg(test)]
    pub(crate) fn is_terminated(&mut self) -> bool {
        let receiver = self.receiver();
        receiver.is_closed() && receiver.is_empty()
    }
}

impl<T> Stream for Observer<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// Gate for outputs that fire only when an entity is present and a trigger
/// arrives. Triggers seen before the entity are dropped.
#[derive(Debug)]
pub struct Gate<E> {
    entity: Option<E>,
}

impl<E> Default for Gate<E> {
    fn default() -> Self {
        Self { entity: None }
    }
}

impl<E: Clone> Gate<E> {
    pub fn set_entity(&mut self, entity: E) {
        self.entity = Some(entity);
    }

    /// Entity to emit with for one trigger occurrence, if it has arrived.
    pub fn fire(&self) -> Option<E> {
        self.entity.clone()
    }
}

#[cfg(test)]
#[path = "tests/subject_tests.rs"]
mod tests;
