//! Handler responses.

/// What a state handler did with an event.
///
/// `Handled` and `Bubble` are valid for every signal. `Transition` is only
/// valid for application events and `Initial` only for `Init`; the engine
/// rejects any other combination with `HsmError::InvalidResponse`.
#[derive(Clone, Debug, PartialEq)]
pub enum Response<S> {
    /// Event consumed, stop bubbling.
    Handled,
    /// Not handled here, pass to the declared superstate.
    Bubble,
    /// Consume the event and transition from this state to the target.
    Transition(S),
    /// Answer to `Init`: make this direct substate the active leaf.
    Initial(S),
}

impl<S> Response<S> {
    /// Short label used in logs and errors.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Handled => "handled",
            Self::Bubble => "bubble",
            Self::Transition(_) => "transition",
            Self::Initial(_) => "initial",
        }
    }
}
