//! Macros for ergonomic state definitions.

/// Generate a `State` implementation for a simple enum, using each
/// variant's identifier as its state name.
///
/// # Example
///
/// ```
/// use mindset_hsm::core::State;
/// use mindset_hsm::state_enum;
///
/// state_enum! {
///     pub enum Door {
///         Closed,
///         Locked,
///         Open,
///     }
/// }
///
/// assert_eq!(Door::Locked.name(), "Locked");
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::core::State;

    state_enum! {
        enum TestState {
            Idle,
            Running,
            Done,
        }
    }

    #[test]
    fn state_enum_macro_generates_trait() {
        assert_eq!(TestState::Idle.name(), "Idle");
        assert_eq!(TestState::Running.name(), "Running");
        assert_eq!(TestState::Done.name(), "Done");
    }

    #[test]
    fn state_enum_supports_visibility_and_attributes() {
        state_enum! {
            #[derive(Copy)]
            pub enum PublicState {
                A,
                /// Documented variant
                B,
            }
        }

        let state = PublicState::B;
        let copy = state;
        assert_eq!(state.name(), copy.name());
    }

    #[test]
    fn generated_states_serialize() {
        let json = serde_json::to_string(&TestState::Running).unwrap();
        let back: TestState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TestState::Running);
    }
}
