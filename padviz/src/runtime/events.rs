use std::sync::mpsc;
use std::sync::mpsc::{Receiver, Sender};

/// Notifications for UI glue observing the application state
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AppEvent {
    DeviceConnected(usize),
    DeviceDisconnected(usize),
    /// Device or user profile lists changed and any rendered list is stale
    RebuildList,
    FrameDrawn(u64),
    FrameSkipped,
}

pub type AppEventSender = Sender<AppEvent>;
pub type AppEventReceiver = Receiver<AppEvent>;

pub fn event_channel() -> (AppEventSender, AppEventReceiver) {
    mpsc::channel()
}
