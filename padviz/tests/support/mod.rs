#![allow(dead_code)]

use std::rc::Rc;
use std::time::{Duration, Instant};

use padviz::prelude::*;

pub const FRAME: Duration = Duration::from_millis(16);

pub const CHROMIUM_ID: &str =
    "Xbox 360 Controller (XInput STANDARD GAMEPAD)";
pub const FIREFOX_ID: &str = "045e-028e-Microsoft X-Box 360 pad";
pub const GENERIC_ID: &str = "0810-0001-Twin USB Joystick";

pub fn chromium_pad(index: usize) -> DeviceSnapshot {
    DeviceSnapshot::with_layout(index, CHROMIUM_ID, 17, 4)
}

pub fn firefox_pad(index: usize) -> DeviceSnapshot {
    DeviceSnapshot::with_layout(index, FIREFOX_ID, 11, 8)
}

pub fn generic_pad(index: usize) -> DeviceSnapshot {
    DeviceSnapshot::with_layout(index, GENERIC_ID, 6, 2)
}

/// A full loop over in-memory collaborators, stepped by hand
pub struct Rig {
    pub backend: Rc<MemoryStore>,
    pub app: App,
    pub scheduler: Scheduler<ManualRequester>,
    pub source: ScriptedSource,
    pub surface: RecordingSurface,
    pub now: Instant,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_backend(Rc::new(MemoryStore::new()))
    }

    pub fn with_backend(backend: Rc<MemoryStore>) -> Self {
        let mut scheduler = Scheduler::new(ManualRequester::new());
        scheduler.start();
        Self {
            app: App::new(backend.clone()),
            backend,
            scheduler,
            source: ScriptedSource::new(),
            surface: RecordingSurface::new(1280, 720),
            now: Instant::now(),
        }
    }

    pub fn tick_after(&mut self, elapsed: Duration) -> TickOutcome {
        self.now += elapsed;
        self.scheduler.tick(
            self.now,
            &mut self.app,
            &mut self.source,
            &mut self.surface,
        )
    }

    /// Run the initializing tick so the next one measures a real delta
    pub fn warm_up(&mut self) {
        assert_eq!(self.tick_after(Duration::ZERO), TickOutcome::Redundant);
    }
}
