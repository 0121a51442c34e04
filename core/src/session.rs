//! The card currently being emulated.

use std::sync::mpsc::Receiver;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::event::{EventSink, LifecycleEvent, StopReason};
use crate::logging::{debug, info};

/// A snapshot of the emulation state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmulationState {
    /// Octets returned to `SELECT` and `READ BINARY`.
    pub payload: Option<Vec<u8>>,

    /// Identifier in its hex text form, decoded on `GET UID`.
    pub identifier: Option<String>,

    pub active: bool,
}

/// Holds the emulated card and its transitions.
///
/// A single session is shared by the frame handling path and the management path, usually
/// through an `Arc`. Every read and write goes through one lock, so a snapshot is never torn.
/// Events are emitted while the lock is held, in the order of the transitions.
#[derive(Default)]
pub struct Session {
    state: Mutex<EmulationState>,
    events: EventSink,
}

impl Session {
    /// Creates an inactive session with no card.
    pub fn new() -> Self {
        Default::default()
    }

    /// Starts emulating the card. The identifier is stored as is and validated only when a
    /// reader asks for it.
    pub fn start(&self, payload: Option<Vec<u8>>, identifier: Option<String>) {
        info!("Starting emulation with UID: {:?}", identifier);

        let mut state = self.lock();
        *state = EmulationState {
            payload,
            identifier: identifier.clone(),
            active: true,
        };

        self.events
            .emit(LifecycleEvent::EmulationStarted { identifier });
    }

    /// Stops emulating and forgets the card.
    pub fn stop(&self) {
        info!("Stopping emulation");

        let mut state = self.lock();
        *state = EmulationState::default();

        self.events.emit(LifecycleEvent::EmulationStopped {
            reason: StopReason::Manual,
        });
    }

    /// Marks the emulation inactive after the link dropped. The card is kept.
    pub fn deactivate(&self, reason: i32) {
        debug!("Deactivated, reason: {}", reason);

        let mut state = self.lock();
        state.active = false;

        self.events.emit(LifecycleEvent::EmulationStopped {
            reason: StopReason::Link(reason),
        });
    }

    /// Marks the emulation inactive because the host service is going away.
    /// Emits no event.
    pub fn shutdown(&self) {
        debug!("Host service destroyed");

        self.lock().active = false;
    }

    /// Returns a consistent copy of the current state.
    pub fn snapshot(&self) -> EmulationState {
        self.lock().clone()
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    /// Attaches a consumer of lifecycle events, replacing the previous one.
    pub fn subscribe(&self) -> Receiver<LifecycleEvent> {
        self.events.subscribe()
    }

    /// Detaches the consumer; events are dropped until the next subscription.
    pub fn unsubscribe(&self) {
        self.events.unsubscribe()
    }

    fn lock(&self) -> MutexGuard<'_, EmulationState> {
        // Every write replaces whole fields, so the state is usable even after a panic.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
