//! Events and signals delivered to state handlers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Discriminator of an [`Event`].
///
/// `Entry`, `Exit`, `Init` and `Empty` are control signals owned by the
/// engine. Everything an application sends is a `User` signal, compared by
/// value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    /// The state is becoming active.
    Entry,
    /// The state is becoming inactive.
    Exit,
    /// The state was entered and may designate an initial substate.
    Init,
    /// Superstate query sentinel. Never mutates the machine.
    Empty,
    /// Application-defined signal.
    User(String),
}

impl Signal {
    /// Whether this is one of the engine's control signals.
    pub fn is_reserved(&self) -> bool {
        !matches!(self, Self::User(_))
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry => f.write_str("ENTRY"),
            Self::Exit => f.write_str("EXIT"),
            Self::Init => f.write_str("INIT"),
            Self::Empty => f.write_str("EMPTY"),
            Self::User(name) => f.write_str(name),
        }
    }
}

/// Immutable event value: a signal plus an optional payload.
///
/// Raw signal names convert into events, so `machine.dispatch("press")`
/// and `machine.dispatch(Event::new("press"))` are equivalent.
///
/// # Example
///
/// ```rust
/// use mindset_hsm::core::{Event, Signal};
/// use serde_json::json;
///
/// let event = Event::new("deposit").with_payload(json!({ "amount": 10 }));
/// assert!(event.is("deposit"));
/// assert_eq!(event.payload().unwrap()["amount"], 10);
///
/// let raw: Event = "deposit".into();
/// assert_eq!(raw.signal(), &Signal::User("deposit".to_string()));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    signal: Signal,
    payload: Option<Value>,
}

impl Event {
    /// Shared Entry event.
    pub const ENTRY: Event = Event::control(Signal::Entry);
    /// Shared Exit event.
    pub const EXIT: Event = Event::control(Signal::Exit);
    /// Shared Init event, used whenever no startup payload is attached.
    pub const INIT: Event = Event::control(Signal::Init);
    /// Shared Empty event.
    pub const EMPTY: Event = Event::control(Signal::Empty);

    const fn control(signal: Signal) -> Self {
        Self {
            signal,
            payload: None,
        }
    }

    /// Create an application event without payload.
    pub fn new(signal: impl Into<String>) -> Self {
        Self {
            signal: Signal::User(signal.into()),
            payload: None,
        }
    }

    /// Attach a payload, returning the new event.
    pub fn with_payload(self, payload: Value) -> Self {
        Self {
            payload: Some(payload),
            ..self
        }
    }

    /// Init event carrying the payload passed to `StateMachine::init`.
    pub(crate) fn init_with(payload: Option<Value>) -> Self {
        Self {
            signal: Signal::Init,
            payload,
        }
    }

    pub fn signal(&self) -> &Signal {
        &self.signal
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Check whether this is the application signal `name`.
    pub fn is(&self, name: &str) -> bool {
        matches!(&self.signal, Signal::User(s) if s == name)
    }
}

impl From<Signal> for Event {
    fn from(signal: Signal) -> Self {
        Self::control(signal)
    }
}

impl From<&str> for Event {
    fn from(signal: &str) -> Self {
        Self::new(signal)
    }
}

impl From<String> for Event {
    fn from(signal: String) -> Self {
        Self::new(signal)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.signal.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn control_events_carry_no_payload() {
        for event in [Event::ENTRY, Event::EXIT, Event::INIT, Event::EMPTY] {
            assert!(event.payload().is_none());
            assert!(event.signal().is_reserved());
        }
    }

    #[test]
    fn raw_names_become_user_signals() {
        let event: Event = "tick".into();
        assert_eq!(event.signal(), &Signal::User("tick".to_string()));
        assert!(!event.signal().is_reserved());
        assert!(event.is("tick"));
        assert!(!event.is("tock"));
    }

    #[test]
    fn user_signal_named_like_control_is_not_reserved() {
        let event = Event::new("ENTRY");
        assert!(!event.signal().is_reserved());
        assert_ne!(event, Event::ENTRY);
    }

    #[test]
    fn payload_is_preserved() {
        let event = Event::new("set").with_payload(json!([1, 2, 3]));
        assert_eq!(event.payload(), Some(&json!([1, 2, 3])));
        assert!(event.is("set"));
    }

    #[test]
    fn display_uses_signal_name() {
        assert_eq!(Event::ENTRY.to_string(), "ENTRY");
        assert_eq!(Event::new("door_open").to_string(), "door_open");
    }
}
