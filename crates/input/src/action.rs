use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A high-level action any input backend can produce.
///
/// The simulation consumes actions and held-key state, never raw window
/// events. Backends own the key bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    MoveForward,
    MoveBackward,
    StrafeLeft,
    StrafeRight,
    /// End the run at the top of the next frame.
    Quit,
}

impl Action {
    pub fn is_movement(self) -> bool {
        !matches!(self, Action::Quit)
    }
}

/// Error for [`Action::from_str`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action {0:?} (expected forward, backward, left, right or quit)")]
pub struct ParseActionError(pub String);

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" | "w" => Ok(Action::MoveForward),
            "backward" | "back" | "s" => Ok(Action::MoveBackward),
            "left" | "a" => Ok(Action::StrafeLeft),
            "right" | "d" => Ok(Action::StrafeRight),
            "quit" | "escape" => Ok(Action::Quit),
            other => Err(ParseActionError(other.to_string())),
        }
    }
}

/// Pressed/released state of the four movement keys for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementKeys {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MovementKeys {
    pub fn none() -> Self {
        Self::default()
    }

    /// Record a press or release. Non-movement actions are ignored.
    pub fn set(&mut self, action: Action, pressed: bool) {
        match action {
            Action::MoveForward => self.forward = pressed,
            Action::MoveBackward => self.backward = pressed,
            Action::StrafeLeft => self.left = pressed,
            Action::StrafeRight => self.right = pressed,
            Action::Quit => {}
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        match action {
            Action::MoveForward => self.forward,
            Action::MoveBackward => self.backward,
            Action::StrafeLeft => self.left,
            Action::StrafeRight => self.right,
            Action::Quit => false,
        }
    }

    pub fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }

    /// Build from a list of held actions.
    pub fn holding(actions: &[Action]) -> Self {
        let mut keys = Self::none();
        for &a in actions {
            keys.set(a, true);
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_names() {
        assert_eq!("forward".parse(), Ok(Action::MoveForward));
        assert_eq!(" Left ".parse(), Ok(Action::StrafeLeft));
        assert_eq!("d".parse(), Ok(Action::StrafeRight));
        assert_eq!("back".parse(), Ok(Action::MoveBackward));
        assert_eq!("escape".parse(), Ok(Action::Quit));
    }

    #[test]
    fn parse_unknown_name_fails() {
        let err = "jump".parse::<Action>().unwrap_err();
        assert_eq!(err, ParseActionError("jump".into()));
    }

    #[test]
    fn set_and_release_keys() {
        let mut keys = MovementKeys::none();
        assert!(!keys.any());
        keys.set(Action::MoveForward, true);
        keys.set(Action::StrafeLeft, true);
        assert!(keys.is_held(Action::MoveForward));
        assert!(keys.is_held(Action::StrafeLeft));
        keys.set(Action::MoveForward, false);
        assert!(!keys.is_held(Action::MoveForward));
        assert!(keys.any());
    }

    #[test]
    fn quit_is_not_a_movement_key() {
        let mut keys = MovementKeys::none();
        keys.set(Action::Quit, true);
        assert!(!keys.any());
        assert!(!Action::Quit.is_movement());
    }

    #[test]
    fn holding_builds_key_set() {
        let keys = MovementKeys::holding(&[Action::MoveBackward, Action::StrafeRight]);
        assert!(keys.backward && keys.right);
        assert!(!keys.forward && !keys.left);
    }
}
