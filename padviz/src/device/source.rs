use std::time::Duration;

use super::snapshot::DeviceSnapshot;
use crate::core::error::{Error, Result};

/// Host notifications delivered outside of polling
#[derive(Clone, Debug, PartialEq)]
pub enum DeviceEvent {
    Connected(DeviceSnapshot),
    Disconnected(DeviceSnapshot),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RumbleEffect {
    pub start_delay: Duration,
    pub duration: Duration,
    pub weak_magnitude: f32,
    pub strong_magnitude: f32,
}

impl RumbleEffect {
    /// Played once when a controller is first seen
    pub fn acknowledge() -> Self {
        Self {
            start_delay: Duration::ZERO,
            duration: Duration::from_millis(300),
            weak_magnitude: 0.5,
            strong_magnitude: 1.0,
        }
    }
}

pub trait DeviceSource {
    /// Current device slots. Empty slots are `None`.
    fn poll(&mut self) -> Vec<Option<DeviceSnapshot>>;

    /// Best effort; callers log and ignore failures.
    fn rumble(&mut self, _index: usize, _effect: RumbleEffect) -> Result<()> {
        Ok(())
    }
}

/// In-memory device source driven by the caller. Used by the simulation
/// command and by tests.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    slots: Vec<Option<DeviceSnapshot>>,
    rumbles: Vec<(usize, RumbleEffect)>,
    fail_rumble: bool,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plug(&mut self, snapshot: DeviceSnapshot) {
        let index = snapshot.index;
        if self.slots.len() <= index {
            self.slots.resize(index + 1, None);
        }
        self.slots[index] = Some(snapshot);
    }

    pub fn unplug(&mut self, index: usize) -> Option<DeviceSnapshot> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    pub fn snapshot_mut(
        &mut self,
        index: usize,
    ) -> Option<&mut DeviceSnapshot> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    pub fn set_fail_rumble(&mut self, fail: bool) {
        self.fail_rumble = fail;
    }

    pub fn rumbles(&self) -> &[(usize, RumbleEffect)] {
        &self.rumbles
    }
}

impl DeviceSource for ScriptedSource {
    fn poll(&mut self) -> Vec<Option<DeviceSnapshot>> {
        self.slots.clone()
    }

    fn rumble(&mut self, index: usize, effect: RumbleEffect) -> Result<()> {
        if self.fail_rumble {
            return Err(Error::Haptics(format!(
                "rumble rejected by device {}",
                index
            )));
        }
        self.rumbles.push((index, effect));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plug_leaves_sparse_slots() {
        let mut source = ScriptedSource::new();
        source.plug(DeviceSnapshot::new(2, "pad"));

        let slots = source.poll();
        assert_eq!(slots.len(), 3);
        assert!(slots[0].is_none());
        assert!(slots[1].is_none());
        assert_eq!(slots[2].as_ref().map(|s| s.index), Some(2));

        assert!(source.unplug(2).is_some());
        assert!(source.poll().iter().all(Option::is_none));
    }
}
