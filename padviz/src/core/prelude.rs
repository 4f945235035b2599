pub use crate::core::logging::{init_logger, init_logger_verbose};
pub use crate::core::logging::{debug, error, info, trace, warn};
pub use crate::device::registry::{DeviceEntry, DeviceRegistry, Transition};
pub use crate::device::snapshot::{ButtonState, DeviceSnapshot};
pub use crate::device::source::{
    DeviceEvent, DeviceSource, RumbleEffect, ScriptedSource,
};
pub use crate::profile::options::{
    EffectiveOptions, OptionDescriptor, OptionKind, OptionValue,
};
pub use crate::profile::{Input, Mapping, VisualizationProfile};
pub use crate::render::layout;
pub use crate::render::surface::{
    DrawCommand, Point, RecordingSurface, Rect, Rgba, Size, Surface,
};
pub use crate::runtime::app::App;
pub use crate::runtime::events::{AppEvent, event_channel};
pub use crate::runtime::scheduler::{
    FrameRequest, FrameRequester, ManualRequester, Scheduler, TickOutcome,
};
pub use crate::runtime::settings::GlobalSettings;
pub use crate::runtime::storage::{FileStore, KeyValueStore, MemoryStore};
pub use crate::runtime::transfer::{ExportedProfile, ImportSlot};
pub use crate::store::user_profiles::{UserProfile, UserProfileStore};
