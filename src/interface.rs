//! Exported state/command interface handles.
//!
//! The hardware component owns all wheel storage; the controller runtime
//! sees it only through lightweight handles (wheel side + field kind)
//! resolved via `DiffBotSystem::state_value` / `set_command`. Handles
//! carry their fully qualified interface name (`<joint>/<field>`) for the
//! runtime's bookkeeping and are valid for the component's lifetime.

use std::fmt;

/// Which wheel a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelSide {
    /// Left wheel
    Left,
    /// Right wheel
    Right,
}

impl WheelSide {
    /// Index into the component's wheel storage.
    pub fn index(self) -> usize {
        match self {
            WheelSide::Left => 0,
            WheelSide::Right => 1,
        }
    }

    /// Both sides, left first (the export ordering).
    pub const BOTH: [WheelSide; 2] = [WheelSide::Left, WheelSide::Right];
}

/// Which exported state field a handle reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    /// Angular position in radians
    Position,
    /// Angular velocity in rad/s
    Velocity,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateKind::Position => f.write_str(crate::joint::HW_IF_POSITION),
            StateKind::Velocity => f.write_str(crate::joint::HW_IF_VELOCITY),
        }
    }
}

/// Non-owning handle to one exported state field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateHandle {
    name: String,
    side: WheelSide,
    kind: StateKind,
}

impl StateHandle {
    pub(crate) fn new(joint: &str, side: WheelSide, kind: StateKind) -> Self {
        Self {
            name: format!("{joint}/{kind}"),
            side,
            kind,
        }
    }

    /// Fully qualified interface name, e.g. `left_wheel/position`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wheel this handle is bound to.
    pub fn side(&self) -> WheelSide {
        self.side
    }

    /// Field this handle reads.
    pub fn kind(&self) -> StateKind {
        self.kind
    }
}

/// Non-owning handle to one exported velocity command slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandHandle {
    name: String,
    side: WheelSide,
}

impl CommandHandle {
    pub(crate) fn new(joint: &str, side: WheelSide) -> Self {
        Self {
            name: format!("{joint}/{}", crate::joint::HW_IF_VELOCITY),
            side,
        }
    }

    /// Fully qualified interface name, e.g. `left_wheel/velocity`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wheel this handle commands.
    pub fn side(&self) -> WheelSide {
        self.side
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_handle_names() {
        let h = StateHandle::new("left_wheel", WheelSide::Left, StateKind::Position);
        assert_eq!(h.name(), "left_wheel/position");
        assert_eq!(h.side(), WheelSide::Left);
        assert_eq!(h.kind(), StateKind::Position);

        let h = StateHandle::new("right_wheel", WheelSide::Right, StateKind::Velocity);
        assert_eq!(h.name(), "right_wheel/velocity");
    }

    #[test]
    fn command_handle_is_always_velocity() {
        let h = CommandHandle::new("left_wheel", WheelSide::Left);
        assert_eq!(h.name(), "left_wheel/velocity");
    }

    #[test]
    fn side_indices_are_stable() {
        assert_eq!(WheelSide::Left.index(), 0);
        assert_eq!(WheelSide::Right.index(), 1);
        assert_eq!(WheelSide::BOTH[0], WheelSide::Left);
    }
}
