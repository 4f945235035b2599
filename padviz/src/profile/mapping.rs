//! Raw index to semantic input lookup tables.

use std::fmt;

use crate::device::snapshot::DeviceSnapshot;

/// Axis magnitude past which a hat axis counts as a pressed direction
const HAT_THRESHOLD: f32 = 0.5;

/// Analog value past which a trigger reported as an axis counts as pressed
const TRIGGER_THRESHOLD: f32 = 0.1;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Input {
    A,
    B,
    X,
    Y,
    LeftBumper,
    RightBumper,
    LeftTrigger,
    RightTrigger,
    Back,
    Start,
    Home,
    LeftStickPress,
    RightStickPress,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    LeftStickX,
    LeftStickY,
    RightStickX,
    RightStickY,
    DpadX,
    DpadY,
}

impl Input {
    pub fn label(self) -> &'static str {
        match self {
            Input::A => "A",
            Input::B => "B",
            Input::X => "X",
            Input::Y => "Y",
            Input::LeftBumper => "Left Bumper",
            Input::RightBumper => "Right Bumper",
            Input::LeftTrigger => "Left Trigger",
            Input::RightTrigger => "Right Trigger",
            Input::Back => "Back",
            Input::Start => "Start",
            Input::Home => "Home",
            Input::LeftStickPress => "Left Stick Press",
            Input::RightStickPress => "Right Stick Press",
            Input::DpadUp => "D-Pad Up",
            Input::DpadDown => "D-Pad Down",
            Input::DpadLeft => "D-Pad Left",
            Input::DpadRight => "D-Pad Right",
            Input::LeftStickX => "Left Stick X",
            Input::LeftStickY => "Left Stick Y",
            Input::RightStickX => "Right Stick X",
            Input::RightStickY => "Right Stick Y",
            Input::DpadX => "D-Pad X",
            Input::DpadY => "D-Pad Y",
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Position in each slice is the raw index reported by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mapping {
    pub buttons: &'static [Input],
    pub axes: &'static [Input],
}

impl Mapping {
    pub const EMPTY: Mapping = Mapping {
        buttons: &[],
        axes: &[],
    };

    pub fn button(&self, index: usize) -> Option<Input> {
        self.buttons.get(index).copied()
    }

    pub fn axis(&self, index: usize) -> Option<Input> {
        self.axes.get(index).copied()
    }

    fn button_index(&self, input: Input) -> Option<usize> {
        self.buttons.iter().position(|&i| i == input)
    }

    fn axis_index(&self, input: Input) -> Option<usize> {
        self.axes.iter().position(|&i| i == input)
    }
}

/// Reads semantic input state out of a snapshot through a [`Mapping`].
///
/// Backends disagree on whether triggers and the d-pad are buttons or axes;
/// the reader hides that difference.
#[derive(Clone, Copy)]
pub struct InputReader<'a> {
    mapping: &'a Mapping,
    snapshot: &'a DeviceSnapshot,
}

impl<'a> InputReader<'a> {
    pub fn new(mapping: &'a Mapping, snapshot: &'a DeviceSnapshot) -> Self {
        Self { mapping, snapshot }
    }

    /// Analog value in `[0, 1]`
    pub fn value(&self, input: Input) -> f32 {
        if let Some(index) = self.mapping.button_index(input) {
            return self.snapshot.button(index).value.clamp(0.0, 1.0);
        }
        if let Some(index) = self.mapping.axis_index(input) {
            // Triggers reported as axes rest at -1
            return (self.snapshot.axis(index) + 1.0) / 2.0;
        }
        match self.hat_direction(input) {
            Some(true) => 1.0,
            _ => 0.0,
        }
    }

    pub fn pressed(&self, input: Input) -> bool {
        if let Some(index) = self.mapping.button_index(input) {
            return self.snapshot.button(index).pressed;
        }
        if self.mapping.axis_index(input).is_some() {
            return self.value(input) > TRIGGER_THRESHOLD;
        }
        self.hat_direction(input).unwrap_or(false)
    }

    /// Axis value in `[-1, 1]`
    pub fn axis(&self, input: Input) -> f32 {
        self.mapping
            .axis_index(input)
            .map(|index| self.snapshot.axis(index))
            .unwrap_or(0.0)
    }

    fn hat_direction(&self, input: Input) -> Option<bool> {
        let (axis, sign) = match input {
            Input::DpadUp => (Input::DpadY, -1.0),
            Input::DpadDown => (Input::DpadY, 1.0),
            Input::DpadLeft => (Input::DpadX, -1.0),
            Input::DpadRight => (Input::DpadX, 1.0),
            _ => return None,
        };
        let index = self.mapping.axis_index(axis)?;
        Some(self.snapshot.axis(index) * sign > HAT_THRESHOLD)
    }
}
