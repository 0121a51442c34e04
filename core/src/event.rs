//! Lifecycle notifications of the emulation session.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Mutex, PoisonError};

/// Why the emulation stopped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Stopped by the management interface.
    Manual,

    /// The contactless link was lost; carries the host's deactivation code.
    Link(i32),
}

#[cfg(feature = "serde")]
impl serde::Serialize for StopReason {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Manual => serializer.serialize_str("manual"),
            Self::Link(code) => serializer.serialize_i32(*code),
        }
    }
}

/// An event emitted whenever the emulation state transitions.
///
/// With the `serde` feature, serializes into a map with the `event` key and either `uid` or
/// `reason`:
/// ```json
/// {"event": "emulation_started", "uid": "04:A2:B3:C4"}
/// {"event": "emulation_stopped", "reason": "manual"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "event", rename_all = "snake_case")
)]
pub enum LifecycleEvent {
    EmulationStarted {
        #[cfg_attr(feature = "serde", serde(rename = "uid"))]
        identifier: Option<String>,
    },
    EmulationStopped {
        reason: StopReason,
    },
}

/// Producer side of the lifecycle event stream, with zero or one consumer.
#[derive(Default)]
pub(crate) struct EventSink {
    sender: Mutex<Option<Sender<LifecycleEvent>>>,
}

impl EventSink {
    /// Attaches a new consumer, detaching the previous one.
    pub(crate) fn subscribe(&self) -> Receiver<LifecycleEvent> {
        let (tx, rx) = channel();
        *self.sender.lock().unwrap_or_else(PoisonError::into_inner) = Some(tx);

        rx
    }

    pub(crate) fn unsubscribe(&self) {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Pushes the event to the consumer if any. Never blocks.
    pub(crate) fn emit(&self, event: LifecycleEvent) {
        let mut sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(tx) = sender.as_ref() {
            if tx.send(event).is_err() {
                // The receiver is gone.
                *sender = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_consumer() {
        let sink = EventSink::default();

        sink.emit(LifecycleEvent::EmulationStopped {
            reason: StopReason::Manual,
        });
    }

    #[test]
    fn test_subscribe_replaces_consumer() {
        let sink = EventSink::default();
        let first = sink.subscribe();
        let second = sink.subscribe();

        sink.emit(LifecycleEvent::EmulationStopped {
            reason: StopReason::Link(1),
        });

        assert!(first.try_recv().is_err());
        assert_eq!(
            LifecycleEvent::EmulationStopped {
                reason: StopReason::Link(1)
            },
            second.try_recv().unwrap()
        );
    }

    #[test]
    fn test_dropped_consumer_is_detached() {
        let sink = EventSink::default();
        drop(sink.subscribe());

        sink.emit(LifecycleEvent::EmulationStarted { identifier: None });

        assert!(sink.sender.lock().unwrap().is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize() {
        let started = LifecycleEvent::EmulationStarted {
            identifier: Some("04:A2:B3:C4".to_string()),
        };
        let manual = LifecycleEvent::EmulationStopped {
            reason: StopReason::Manual,
        };
        let link = LifecycleEvent::EmulationStopped {
            reason: StopReason::Link(1),
        };

        assert_eq!(
            serde_json::json!({"event": "emulation_started", "uid": "04:A2:B3:C4"}),
            serde_json::to_value(started).unwrap()
        );
        assert_eq!(
            serde_json::json!({"event": "emulation_stopped", "reason": "manual"}),
            serde_json::to_value(manual).unwrap()
        );
        assert_eq!(
            serde_json::json!({"event": "emulation_stopped", "reason": 1}),
            serde_json::to_value(link).unwrap()
        );
    }
}
