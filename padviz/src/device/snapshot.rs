//! Read-only per-tick view of one physical controller.

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ButtonState {
    /// Analog value in `[0, 1]`
    pub value: f32,
    pub pressed: bool,
    pub touched: bool,
}

impl ButtonState {
    pub fn pressed(value: f32) -> Self {
        Self {
            value,
            pressed: true,
            touched: true,
        }
    }

    pub fn released() -> Self {
        Self::default()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeviceSnapshot {
    /// Slot index assigned by the host for the lifetime of a connection
    pub index: usize,
    /// Host-reported identity string, e.g. vendor/product description
    pub id: String,
    pub buttons: Vec<ButtonState>,
    /// Axis values in `[-1, 1]`
    pub axes: Vec<f32>,
    /// Whether the device accepts rumble effects
    pub rumble: bool,
}

impl DeviceSnapshot {
    pub fn new(index: usize, id: impl Into<String>) -> Self {
        Self {
            index,
            id: id.into(),
            buttons: Vec::new(),
            axes: Vec::new(),
            rumble: false,
        }
    }

    /// A snapshot with `buttons` released buttons and `axes` centered axes
    pub fn with_layout(
        index: usize,
        id: impl Into<String>,
        buttons: usize,
        axes: usize,
    ) -> Self {
        Self {
            buttons: vec![ButtonState::released(); buttons],
            axes: vec![0.0; axes],
            ..Self::new(index, id)
        }
    }

    pub fn button(&self, index: usize) -> ButtonState {
        self.buttons.get(index).copied().unwrap_or_default()
    }

    pub fn axis(&self, index: usize) -> f32 {
        self.axes.get(index).copied().unwrap_or(0.0).clamp(-1.0, 1.0)
    }

    pub fn set_button(&mut self, index: usize, state: ButtonState) {
        if let Some(button) = self.buttons.get_mut(index) {
            *button = state;
        }
    }

    pub fn set_axis(&mut self, index: usize, value: f32) {
        if let Some(axis) = self.axes.get_mut(index) {
            *axis = value.clamp(-1.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_reads_are_neutral() {
        let snapshot = DeviceSnapshot::with_layout(0, "pad", 2, 1);
        assert_eq!(snapshot.button(5), ButtonState::default());
        assert_eq!(snapshot.axis(3), 0.0);
    }

    #[test]
    fn set_axis_clamps() {
        let mut snapshot = DeviceSnapshot::with_layout(0, "pad", 0, 2);
        snapshot.set_axis(1, 3.0);
        assert_eq!(snapshot.axis(1), 1.0);
    }
}
