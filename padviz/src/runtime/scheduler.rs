use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::trace;

use super::app::App;
use super::events::AppEvent;
use crate::device::source::DeviceSource;
use crate::render::surface::Surface;

/// Handle to one outstanding request for the next refresh tick
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct FrameRequest(pub u64);

/// The host's "call me on the next refresh" capability
pub trait FrameRequester {
    fn request_frame(&mut self) -> FrameRequest;
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Requester for hosts that call [`Scheduler::tick`] themselves. Keeps
/// count of what was asked of it.
#[derive(Debug, Default)]
pub struct ManualRequester {
    next_id: u64,
    requested: u64,
    cancelled: u64,
    outstanding: Option<FrameRequest>,
}

impl ManualRequester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requested(&self) -> u64 {
        self.requested
    }

    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }

    pub fn outstanding(&self) -> Option<FrameRequest> {
        self.outstanding
    }
}

impl FrameRequester for ManualRequester {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        self.requested += 1;
        let request = FrameRequest(self.next_id);
        self.outstanding = Some(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.cancelled += 1;
        if self.outstanding == Some(request) {
            self.outstanding = None;
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickOutcome {
    Drawn,
    /// Nothing changed since the idle placeholder was drawn
    Skipped,
    /// No time passed since the last draw
    Redundant,
}

/// Drives [`App`] from the host's refresh signal.
///
/// Every tick polls devices, decides whether a draw is warranted, and
/// leaves exactly one frame request outstanding. The loop never stops
/// itself.
pub struct Scheduler<R: FrameRequester> {
    requester: R,
    pending: Option<FrameRequest>,
    started: Option<Instant>,
    last_draw: Option<Instant>,
    frame_count: u64,
    frame_intervals: VecDeque<Duration>,
    max_intervals: usize,
}

impl<R: FrameRequester> Scheduler<R> {
    pub fn new(requester: R) -> Self {
        Self {
            requester,
            pending: None,
            started: None,
            last_draw: None,
            frame_count: 0,
            frame_intervals: VecDeque::new(),
            max_intervals: 90,
        }
    }

    /// Ask for the first tick
    pub fn start(&mut self) {
        self.reschedule();
    }

    pub fn requester(&self) -> &R {
        &self.requester
    }

    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Mean rate over the most recent draws
    pub fn average_fps(&self) -> f32 {
        if self.frame_intervals.is_empty() {
            return 0.0;
        }

        let sum: Duration = self.frame_intervals.iter().copied().sum();
        let avg = sum / self.frame_intervals.len() as u32;

        if avg.is_zero() {
            return 0.0;
        }

        1.0 / avg.as_secs_f32()
    }

    pub fn tick(
        &mut self,
        now: Instant,
        app: &mut App,
        source: &mut dyn DeviceSource,
        surface: &mut dyn Surface,
    ) -> TickOutcome {
        let started = *self.started.get_or_insert(now);
        let last_draw = *self.last_draw.get_or_insert(now);
        let delta = now.saturating_duration_since(last_draw);

        let should_draw = app.update(source, delta);

        if delta.is_zero() {
            trace!("Zero frame delta; rescheduling");
            self.reschedule();
            return TickOutcome::Redundant;
        }

        if !should_draw && !app.force_redraw() {
            if app.settings().debug() {
                trace!("Skipping frame; nothing changed");
            }
            app.emit(AppEvent::FrameSkipped);
            self.reschedule();
            return TickOutcome::Skipped;
        }

        let last_draw_ms =
            last_draw.duration_since(started).as_secs_f64() * 1000.0;
        app.draw(surface, last_draw_ms);

        self.last_draw = Some(now);
        self.frame_count += 1;
        self.record_interval(delta);
        app.emit(AppEvent::FrameDrawn(self.frame_count));

        self.reschedule();
        TickOutcome::Drawn
    }

    fn reschedule(&mut self) {
        if let Some(request) = self.pending.take() {
            self.requester.cancel_frame(request);
        }
        self.pending = Some(self.requester.request_frame());
    }

    fn record_interval(&mut self, interval: Duration) {
        self.frame_intervals.push_back(interval);
        if self.frame_intervals.len() > self.max_intervals {
            self.frame_intervals.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::device::snapshot::DeviceSnapshot;
    use crate::device::source::ScriptedSource;
    use crate::render::surface::RecordingSurface;
    use crate::runtime::storage::MemoryStore;

    const FRAME: Duration = Duration::from_millis(16);

    struct Harness {
        scheduler: Scheduler<ManualRequester>,
        app: App,
        source: ScriptedSource,
        surface: RecordingSurface,
        now: Instant,
    }

    impl Harness {
        fn new() -> Self {
            let mut scheduler = Scheduler::new(ManualRequester::new());
            scheduler.start();
            Self {
                scheduler,
                app: App::new(Rc::new(MemoryStore::new())),
                source: ScriptedSource::new(),
                surface: RecordingSurface::new(800, 600),
                now: Instant::now(),
            }
        }

        fn tick_after(&mut self, elapsed: Duration) -> TickOutcome {
            self.now += elapsed;
            self.scheduler.tick(
                self.now,
                &mut self.app,
                &mut self.source,
                &mut self.surface,
            )
        }
    }

    #[test]
    fn first_tick_is_redundant_then_idle_frame_draws_once() {
        let mut h = Harness::new();
        assert_eq!(h.tick_after(Duration::ZERO), TickOutcome::Redundant);
        assert_eq!(h.tick_after(FRAME), TickOutcome::Drawn);
        assert_eq!(h.tick_after(FRAME), TickOutcome::Skipped);
        assert_eq!(h.tick_after(FRAME), TickOutcome::Skipped);
        assert_eq!(h.scheduler.frame_count(), 1);
    }

    #[test]
    fn exactly_one_request_stays_outstanding() {
        let mut h = Harness::new();
        for elapsed in [Duration::ZERO, FRAME, FRAME, Duration::ZERO] {
            h.tick_after(elapsed);
            let requester = h.scheduler.requester();
            assert_eq!(requester.outstanding(), h.scheduler.pending());
            assert_eq!(requester.requested(), requester.cancelled() + 1);
        }
    }

    #[test]
    fn zero_delta_never_draws() {
        let mut h = Harness::new();
        h.tick_after(Duration::ZERO);
        h.tick_after(FRAME);
        h.app.request_redraw();
        assert_eq!(h.tick_after(Duration::ZERO), TickOutcome::Redundant);
        assert!(h.app.force_redraw());
        assert_eq!(h.tick_after(FRAME), TickOutcome::Drawn);
        assert_eq!(h.scheduler.frame_count(), 2);
    }

    #[test]
    fn force_redraw_wakes_idle_loop() {
        let mut h = Harness::new();
        h.tick_after(Duration::ZERO);
        h.tick_after(FRAME);
        assert_eq!(h.tick_after(FRAME), TickOutcome::Skipped);

        h.app.request_redraw();
        assert_eq!(h.tick_after(FRAME), TickOutcome::Drawn);
        assert!(!h.app.force_redraw());
        assert_eq!(h.tick_after(FRAME), TickOutcome::Skipped);
    }

    #[test]
    fn active_devices_draw_every_frame() {
        let mut h = Harness::new();
        h.source.plug(DeviceSnapshot::with_layout(0, "pad", 4, 2));
        h.tick_after(Duration::ZERO);
        for _ in 0..5 {
            assert_eq!(h.tick_after(FRAME), TickOutcome::Drawn);
        }
        assert_eq!(h.app.registry().len(), 1);
        assert!((h.scheduler.average_fps() - 62.5).abs() < 0.01);
    }
}
