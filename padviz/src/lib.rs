//! Live gamepad input visualization.
//!
//! The crate owns everything between a device polling source and a drawing
//! surface: controller profiles that map raw button/axis indices to
//! semantic inputs, per-profile user options with durable persistence, the
//! set of connected devices, the frame scheduler, and the layout/draw pass.
//! Hosts supply the collaborators ([`device::source::DeviceSource`],
//! [`render::surface::Surface`], [`runtime::storage::KeyValueStore`],
//! [`runtime::scheduler::FrameRequester`]) and drive
//! [`runtime::scheduler::Scheduler::tick`] from their refresh signal.

pub mod core {
    pub mod error;
    pub mod logging;
    pub mod prelude;
}

pub mod device {
    pub mod registry;
    pub mod snapshot;
    pub mod source;
}

pub mod profile;

pub mod render {
    pub mod draw;
    pub mod layout;
    pub mod surface;
}

pub mod runtime {
    pub mod app;
    pub mod events;
    pub mod scheduler;
    pub mod settings;
    pub mod storage;
    pub mod transfer;
}

pub mod store {
    pub mod user_profiles;
}

pub use crate::core::error::{Error, Result};
pub use crate::core::prelude;
