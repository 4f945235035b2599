use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use log::{debug, error, info, warn};
use serde_json::Value;

use super::events::{AppEvent, AppEventSender};
use super::settings::GlobalSettings;
use super::storage::KeyValueStore;
use super::transfer::{ExportedProfile, ImportSlot};
use crate::core::error::{Error, Result};
use crate::device::registry::{DeviceEntry, DeviceRegistry, Transition};
use crate::device::source::{DeviceEvent, DeviceSource, RumbleEffect};
use crate::profile::VisualizationProfile;
use crate::profile::options::{EffectiveOptions, OptionValue};
use crate::render::draw::{self, Glyph, Overlay};
use crate::render::surface::{Rgba, Surface};
use crate::store::user_profiles::{UserProfile, UserProfileStore};

/// Name given to a profile edited before it was ever named
pub const UNNAMED_PROFILE: &str = "No name";

/// Everything the render loop reads and UI actions mutate.
///
/// Any mutation that changes what is on screen raises the force-redraw
/// flag; the next completed draw clears it.
pub struct App {
    backend: Rc<dyn KeyValueStore>,
    registry: DeviceRegistry,
    store: UserProfileStore,
    settings: GlobalSettings,
    force_redraw: bool,
    empty_frame_rendered: bool,
    fps: f32,
    event_tx: Option<AppEventSender>,
}

impl App {
    /// Restore the store and settings persisted in `backend`
    pub fn new(backend: Rc<dyn KeyValueStore>) -> Self {
        Self {
            registry: DeviceRegistry::new(),
            store: UserProfileStore::load(backend.clone()),
            settings: GlobalSettings::load(backend.clone()),
            backend,
            force_redraw: true,
            empty_frame_rendered: false,
            fps: 0.0,
            event_tx: None,
        }
    }

    pub fn with_events(mut self, event_tx: AppEventSender) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn store(&self) -> &UserProfileStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut UserProfileStore {
        &mut self.store
    }

    pub fn settings(&self) -> &GlobalSettings {
        &self.settings
    }

    /// Rate implied by the most recent tick delta
    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn force_redraw(&self) -> bool {
        self.force_redraw
    }

    pub fn request_redraw(&mut self) {
        self.force_redraw = true;
    }

    /// Poll devices and decide whether this tick needs a draw.
    ///
    /// A zero `delta` only polls. With no devices only the first idle frame
    /// draws until something raises the force-redraw flag.
    pub fn update(
        &mut self,
        source: &mut dyn DeviceSource,
        delta: Duration,
    ) -> bool {
        self.poll(source);

        if delta.is_zero() {
            self.fps = 0.0;
            return false;
        }
        self.fps = 1.0 / delta.as_secs_f32();

        if self.registry.is_empty() {
            if self.empty_frame_rendered && !self.force_redraw {
                return false;
            }
            self.empty_frame_rendered = true;
        } else {
            self.empty_frame_rendered = false;
        }

        self.force_redraw = false;
        true
    }

    pub fn draw(&mut self, surface: &mut dyn Surface, last_draw_ms: f64) {
        self.force_redraw = false;

        let global = self.settings.global_options();
        let glyphs: Vec<Glyph> = self
            .registry
            .entries()
            .map(|entry| Glyph {
                visualization: entry.visualization,
                snapshot: &entry.snapshot,
                options: EffectiveOptions::merge(
                    entry.visualization.options(),
                    &global,
                    &entry.user_profile(&self.store),
                ),
            })
            .collect();

        let overlay = self.settings.debug().then_some(Overlay {
            last_draw_ms,
            fps: self.fps,
        });

        draw::draw_frame(
            surface,
            &glyphs,
            self.settings.background_color(),
            overlay,
        );
    }

    /// Options a device is currently drawn with
    pub fn effective_options(&self, index: usize) -> Result<EffectiveOptions> {
        let entry = self.entry(index)?;
        Ok(EffectiveOptions::merge(
            entry.visualization.options(),
            &self.settings.global_options(),
            &entry.user_profile(&self.store),
        ))
    }

    pub fn poll(&mut self, source: &mut dyn DeviceSource) {
        let transitions = self.registry.apply_poll(source.poll(), &self.store);
        for transition in transitions {
            self.on_transition(transition, source);
        }
    }

    pub fn handle_device_event(
        &mut self,
        event: DeviceEvent,
        source: &mut dyn DeviceSource,
    ) {
        let transition = match event {
            DeviceEvent::Connected(snapshot) => {
                debug!(
                    "Device connected at {}: {}. {} buttons, {} axes.",
                    snapshot.index,
                    snapshot.id,
                    snapshot.buttons.len(),
                    snapshot.axes.len()
                );
                self.registry.connect(snapshot, &self.store)
            }
            DeviceEvent::Disconnected(snapshot) => {
                debug!(
                    "Device disconnected from {}: {}",
                    snapshot.index, snapshot.id
                );
                self.registry.disconnect(snapshot.index)
            }
        };

        if let Some(transition) = transition {
            self.on_transition(transition, source);
        }
    }

    /// Size the surface to the window in physical pixels
    pub fn resize(
        &mut self,
        surface: &mut dyn Surface,
        width: f32,
        height: f32,
        pixel_ratio: f32,
    ) {
        let width = (width * pixel_ratio).floor().max(0.0) as u32;
        let height = (height * pixel_ratio).floor().max(0.0) as u32;
        surface.resize(width, height);
        self.force_redraw = true;
    }

    pub fn set_background_color(&mut self, color: Rgba) {
        self.settings.set_background_color(color);
        self.force_redraw = true;
    }

    pub fn set_draw_alpha_mask(&mut self, enabled: bool) {
        self.settings.set_draw_alpha_mask(enabled);
        self.force_redraw = true;
    }

    pub fn set_debug(&mut self, enabled: bool) {
        self.settings.set_debug(enabled);
        self.force_redraw = true;
    }

    /// Render a device with another profile, keeping its user profile name
    /// when that name exists under the new profile
    pub fn select_visualization(
        &mut self,
        index: usize,
        visualization: VisualizationProfile,
    ) -> Result<()> {
        let current = self.entry(index)?.user_profile.clone();

        let known = self.store.user_profile(visualization, &current);
        let name = if known.is_some() {
            current
        } else {
            match self.store.default_profile(visualization) {
                Ok(profile) => profile.profile_name().to_string(),
                Err(err) => {
                    warn!("{}; keeping {}", err, visualization);
                    return Ok(());
                }
            }
        };

        let entry = self.entry_mut(index)?;
        entry.visualization = visualization;
        entry.user_profile = name;

        self.force_redraw = true;
        self.rebuild_list();
        Ok(())
    }

    /// Point a device at a stored user profile and mark it last used
    pub fn select_user_profile(
        &mut self,
        index: usize,
        name: &str,
    ) -> Result<()> {
        let visualization = self.entry(index)?.visualization;

        if !self.store.activate(visualization, name) {
            warn!(
                "No user profile '{}' for {}; selection ignored",
                name, visualization
            );
            return Ok(());
        }

        self.entry_mut(index)?.user_profile = name.to_string();
        self.force_redraw = true;
        self.rebuild_list();
        Ok(())
    }

    /// Change one option of a device's user profile. Returns whether the
    /// stored profile changed.
    pub fn set_option(
        &mut self,
        index: usize,
        option_id: &str,
        value: OptionValue,
    ) -> Result<bool> {
        let entry = self.entry(index)?;
        let visualization = entry.visualization;

        let descriptor = visualization.option(option_id).ok_or_else(|| {
            Error::UnknownOption {
                profile: visualization.name().to_string(),
                option: option_id.to_string(),
            }
        })?;
        if !descriptor.kind().accepts(&value) {
            return Err(Error::InvalidValue {
                option: option_id.to_string(),
                kind: descriptor.kind().to_string(),
            });
        }

        let mut profile = entry.user_profile(&self.store).into_owned();
        if profile.profile_name().is_empty() {
            profile.set_profile_name(UNNAMED_PROFILE);
        }
        profile.set(option_id, value);

        let name = profile.profile_name().to_string();
        let changed = self.store.add_or_update(visualization, profile);
        self.entry_mut(index)?.user_profile = name;

        self.force_redraw = true;
        if changed {
            self.rebuild_list();
        }
        Ok(changed)
    }

    /// Drop a device's user profile from the store and fall back to the
    /// profile default
    pub fn reset_user_profile(&mut self, index: usize) -> Result<()> {
        let entry = self.entry(index)?;
        let visualization = entry.visualization;
        let profile = entry.user_profile(&self.store).into_owned();

        self.store.remove(visualization, &profile);
        let default = self.default_name(visualization);
        self.entry_mut(index)?.user_profile = default;

        self.force_redraw = true;
        self.rebuild_list();
        Ok(())
    }

    /// Forget every stored profile and setting
    pub fn reset_all(&mut self) {
        if let Err(err) = self.backend.clear() {
            error!("Failed to clear storage: {}", err);
        }
        self.store.reset();
        self.settings = GlobalSettings::load(self.backend.clone());

        let defaults: Vec<(usize, String)> = self
            .registry
            .entries()
            .map(|e| (e.index(), self.default_name(e.visualization)))
            .collect();
        for (index, name) in defaults {
            if let Some(entry) = self.registry.get_mut(index) {
                entry.user_profile = name;
            }
        }

        info!("Reset all user profiles and settings");
        self.force_redraw = true;
        self.rebuild_list();
    }

    pub fn export_user_profile(&self, index: usize) -> Result<ExportedProfile> {
        let entry = self.entry(index)?;
        Ok(ExportedProfile::new(
            &entry.snapshot.id,
            entry.visualization,
            &entry.user_profile(&self.store),
        ))
    }

    pub fn export_user_profile_to(
        &self,
        index: usize,
        dir: &Path,
    ) -> Result<PathBuf> {
        self.export_user_profile(index)?.write_to(dir)
    }

    /// Store an uploaded profile under `visualization` and make it the
    /// device's active profile. `visualization` must be the one the device
    /// is rendered by. A missing document is a logged no-op. Returns
    /// whether the store changed.
    pub fn import_user_profile(
        &mut self,
        index: usize,
        visualization: VisualizationProfile,
        document: Option<&Value>,
    ) -> Result<bool> {
        let current = self.entry(index)?.visualization;
        if current != visualization {
            return Err(Error::VisualizationMismatch {
                index,
                current: current.name().to_string(),
                requested: visualization.name().to_string(),
            });
        }

        let Some(document) = document else {
            warn!("Nothing staged to import");
            return Ok(false);
        };

        let profile = UserProfile::from_json(visualization, document)?;
        let name = profile.profile_name().to_string();
        let changed = self.store.add_or_update(visualization, profile);

        let name = if self.store.user_profile(visualization, &name).is_some() {
            name
        } else {
            warn!("Imported profile '{}' not found; using default", name);
            self.default_name(visualization)
        };

        self.entry_mut(index)?.user_profile = name;

        self.force_redraw = true;
        self.rebuild_list();
        Ok(changed)
    }

    /// Consume whatever `slot` holds as an import for the device's current
    /// visualization profile
    pub fn commit_import(
        &mut self,
        index: usize,
        slot: &mut ImportSlot,
    ) -> Result<bool> {
        let visualization = self.entry(index)?.visualization;
        let staged = slot.take();
        match self.import_user_profile(index, visualization, staged.as_ref()) {
            Err(err @ Error::MalformedProfile(_)) => {
                warn!("Import rejected: {}", err);
                Ok(false)
            }
            result => result,
        }
    }

    /// Repair devices whose user profile is no longer stored, then notify
    /// list observers
    pub fn rebuild_list(&mut self) {
        let stale: Vec<(usize, String)> = self
            .registry
            .entries()
            .filter(|e| {
                self.store
                    .user_profile(e.visualization, &e.user_profile)
                    .is_none()
            })
            .map(|e| (e.index(), self.default_name(e.visualization)))
            .collect();

        for (index, name) in stale {
            if let Some(entry) = self.registry.get_mut(index) {
                warn!(
                    "User profile '{}' of device {} is gone; using '{}'",
                    entry.user_profile, index, name
                );
                entry.user_profile = name;
            }
        }

        self.emit(AppEvent::RebuildList);
    }

    pub fn emit(&self, event: AppEvent) {
        let Some(event_tx) = self.event_tx.as_ref() else {
            return;
        };

        if let Err(err) = event_tx.send(event) {
            warn!("Failed to emit app event: {}", err);
        }
    }

    fn on_transition(
        &mut self,
        transition: Transition,
        source: &mut dyn DeviceSource,
    ) {
        match transition {
            Transition::Created(index) => {
                let rumble = self
                    .registry
                    .get(index)
                    .is_some_and(|entry| entry.snapshot.rumble);
                if rumble {
                    let effect = RumbleEffect::acknowledge();
                    if let Err(err) = source.rumble(index, effect) {
                        error!("{}", err);
                    }
                }
                self.emit(AppEvent::DeviceConnected(index));
            }
            Transition::Destroyed(index) => {
                self.emit(AppEvent::DeviceDisconnected(index));
            }
        }
        self.force_redraw = true;
        self.rebuild_list();
    }

    fn default_name(&self, visualization: VisualizationProfile) -> String {
        match self.store.default_profile(visualization) {
            Ok(profile) => profile.profile_name().to_string(),
            Err(err) => {
                warn!("{}", err);
                crate::profile::DEFAULT_USER_PROFILE_NAME.to_string()
            }
        }
    }

    fn entry(&self, index: usize) -> Result<&DeviceEntry> {
        self.registry.get(index).ok_or(Error::UnknownDevice(index))
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut DeviceEntry> {
        self.registry
            .get_mut(index)
            .ok_or(Error::UnknownDevice(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::snapshot::DeviceSnapshot;
    use crate::device::source::ScriptedSource;
    use crate::render::surface::RecordingSurface;
    use crate::runtime::events::event_channel;
    use crate::runtime::storage::MemoryStore;

    const XBOX: VisualizationProfile = VisualizationProfile::XboxFirefox;
    const FRAME: Duration = Duration::from_millis(16);

    fn xbox(index: usize) -> DeviceSnapshot {
        DeviceSnapshot::with_layout(
            index,
            "045e-028e-Microsoft X-Box 360 pad",
            11,
            8,
        )
    }

    fn app_with(snapshot: DeviceSnapshot) -> (App, ScriptedSource) {
        let mut app = App::new(Rc::new(MemoryStore::new()));
        let mut source = ScriptedSource::new();
        source.plug(snapshot);
        app.poll(&mut source);
        (app, source)
    }

    #[test]
    fn idle_update_draws_once() {
        let mut app = App::new(Rc::new(MemoryStore::new()));
        let mut source = ScriptedSource::new();
        assert!(app.update(&mut source, FRAME));
        assert!(!app.update(&mut source, FRAME));

        app.request_redraw();
        assert!(app.update(&mut source, FRAME));
        assert!(!app.update(&mut source, FRAME));
        assert!(!app.update(&mut source, Duration::ZERO));
        assert_eq!(app.fps(), 0.0);
    }

    #[test]
    fn update_reports_fps_from_delta() {
        let mut app = App::new(Rc::new(MemoryStore::new()));
        app.update(&mut ScriptedSource::new(), Duration::from_millis(20));
        assert!((app.fps() - 50.0).abs() < 0.001);
    }

    #[test]
    fn connect_acknowledges_with_rumble() {
        let mut snapshot = xbox(1);
        snapshot.rumble = true;
        let (app, source) = app_with(snapshot);
        assert_eq!(app.registry().len(), 1);
        assert_eq!(source.rumbles(), &[(1, RumbleEffect::acknowledge())]);
    }

    #[test]
    fn rumble_failure_is_not_fatal() {
        let mut app = App::new(Rc::new(MemoryStore::new()));
        let mut source = ScriptedSource::new();
        source.set_fail_rumble(true);
        let mut snapshot = xbox(0);
        snapshot.rumble = true;

        app.handle_device_event(DeviceEvent::Connected(snapshot), &mut source);
        assert_eq!(app.registry().len(), 1);
    }

    #[test]
    fn events_follow_device_lifecycle() {
        let (tx, rx) = event_channel();
        let mut app = App::new(Rc::new(MemoryStore::new())).with_events(tx);
        let mut source = ScriptedSource::new();

        app.handle_device_event(DeviceEvent::Connected(xbox(3)), &mut source);
        app.handle_device_event(
            DeviceEvent::Disconnected(xbox(3)),
            &mut source,
        );

        let events: Vec<AppEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                AppEvent::DeviceConnected(3),
                AppEvent::RebuildList,
                AppEvent::DeviceDisconnected(3),
                AppEvent::RebuildList,
            ]
        );
    }

    #[test]
    fn set_option_upserts_and_validates() {
        let (mut app, _) = app_with(xbox(0));

        let color = OptionValue::from("#000000");
        assert!(app.set_option(0, "colorBody", color.clone()).unwrap());
        assert!(!app.set_option(0, "colorBody", color.clone()).unwrap());
        let options = app.effective_options(0).unwrap();
        assert_eq!(options.get("colorBody"), Some(&color));

        assert!(matches!(
            app.set_option(0, "nope", OptionValue::from(true)),
            Err(Error::UnknownOption { .. })
        ));
        assert!(matches!(
            app.set_option(0, "drawLabels", OptionValue::from("yes")),
            Err(Error::InvalidValue { .. })
        ));
        assert!(matches!(
            app.set_option(9, "colorBody", color),
            Err(Error::UnknownDevice(9))
        ));
    }

    #[test]
    fn edits_are_shared_by_devices_on_the_same_profile() {
        let (mut app, mut source) = app_with(xbox(0));
        source.plug(xbox(1));
        app.poll(&mut source);

        let color = OptionValue::from("#00FF00");
        app.set_option(0, "colorBody", color.clone()).unwrap();
        app.select_user_profile(1, "Default").unwrap();
        assert_eq!(
            app.effective_options(1).unwrap().get("colorBody"),
            Some(&color)
        );
    }

    #[test]
    fn alpha_mask_reaches_every_device() {
        let (mut app, _) = app_with(xbox(0));
        app.set_draw_alpha_mask(true);
        let options = app.effective_options(0).unwrap();
        assert!(options.alpha_mask());
        assert_eq!(options.color("colorBody"), Rgba::WHITE);
    }

    #[test]
    fn select_visualization_keeps_or_defaults_name() {
        let (mut app, _) = app_with(xbox(0));
        app.set_option(0, "colorBody", OptionValue::from("#101010"))
            .unwrap();

        app.select_visualization(0, VisualizationProfile::Unknown)
            .unwrap();
        let entry = app.registry().get(0).unwrap();
        assert_eq!(entry.visualization, VisualizationProfile::Unknown);
        assert_eq!(entry.user_profile, "Default");
    }

    #[test]
    fn select_missing_user_profile_is_ignored() {
        let (mut app, _) = app_with(xbox(0));
        app.select_user_profile(0, "Nope").unwrap();
        assert_eq!(app.registry().get(0).unwrap().user_profile, "Default");
    }

    #[test]
    fn reset_user_profile_returns_to_default() {
        let (mut app, _) = app_with(xbox(0));
        app.set_option(0, "colorBody", OptionValue::from("#101010"))
            .unwrap();
        app.reset_user_profile(0).unwrap();

        assert_eq!(
            app.store().user_profile(XBOX, "Default"),
            app.store().default_profile(XBOX).ok()
        );
        assert_eq!(
            app.effective_options(0).unwrap().color("colorBody"),
            Rgba::from_hex("#F2F2F2").unwrap()
        );
    }

    #[test]
    fn reset_all_clears_storage_and_settings() {
        let backend = Rc::new(MemoryStore::new());
        let mut app = App::new(backend.clone());
        let mut source = ScriptedSource::new();
        source.plug(xbox(0));
        app.poll(&mut source);

        app.set_debug(true);
        app.set_option(0, "title", OptionValue::from("Player 1"))
            .unwrap();
        app.reset_all();

        assert!(!app.settings().debug());
        assert_eq!(app.store().user_profiles(XBOX).len(), 1);
        assert_eq!(app.effective_options(0).unwrap().text("title"), "");
        assert!(App::new(backend).store().last_used(XBOX).is_none());
    }

    #[test]
    fn rebuild_repairs_dangling_profiles() {
        let (mut app, _) = app_with(xbox(0));
        app.set_option(0, "title", OptionValue::from("P1")).unwrap();
        let profile = app.store().user_profile(XBOX, "Default").cloned();

        let mut renamed = profile.unwrap();
        renamed.set_profile_name("Renamed");
        app.store_mut().add_or_update(XBOX, renamed);
        app.select_user_profile(0, "Renamed").unwrap();
        let gone = app.store().user_profile(XBOX, "Renamed").cloned();
        app.store_mut().remove(XBOX, &gone.unwrap());

        app.rebuild_list();
        assert_eq!(app.registry().get(0).unwrap().user_profile, "Default");
    }

    #[test]
    fn resize_uses_physical_pixels() {
        let mut app = App::new(Rc::new(MemoryStore::new()));
        let mut surface = RecordingSurface::new(1, 1);
        app.update(&mut ScriptedSource::new(), FRAME);
        assert!(!app.force_redraw());

        app.resize(&mut surface, 801.0, 600.5, 1.5);
        assert_eq!(surface.size().width, 1201.0);
        assert_eq!(surface.size().height, 900.0);
        assert!(app.force_redraw());
    }

    #[test]
    fn import_requires_a_document() {
        let (mut app, _) = app_with(xbox(0));
        assert!(!app.import_user_profile(0, XBOX, None).unwrap());

        let mut slot = ImportSlot::new();
        slot.stage_str("{ broken");
        assert!(!app.commit_import(0, &mut slot).unwrap());

        slot.stage_str(r##"{ "colorBody": "#000000" }"##);
        assert!(!app.commit_import(0, &mut slot).unwrap());
        assert_eq!(app.store().user_profiles(XBOX).len(), 1);
    }

    #[test]
    fn import_keeps_the_device_visualization() {
        let (mut app, _) = app_with(xbox(0));
        let document = serde_json::json!({ "profileName": "Elsewhere" });
        let unknown = VisualizationProfile::Unknown;

        let result = app.import_user_profile(0, unknown, Some(&document));
        assert!(matches!(
            result,
            Err(Error::VisualizationMismatch { index: 0, .. })
        ));

        let entry = app.registry().get(0).unwrap();
        assert_eq!(entry.visualization, XBOX);
        assert_ne!(entry.user_profile, "Elsewhere");
        assert!(app.store().user_profile(unknown, "Elsewhere").is_none());
    }

    #[test]
    fn commit_import_activates_profile() {
        let (mut app, _) = app_with(xbox(0));
        let mut slot = ImportSlot::new();
        slot.stage_str(
            r##"{ "profileName": "Shared", "colorBody": "#ABCDEF" }"##,
        );

        assert!(app.commit_import(0, &mut slot).unwrap());
        assert_eq!(app.registry().get(0).unwrap().user_profile, "Shared");
        assert_eq!(
            app.effective_options(0).unwrap().color("colorBody"),
            Rgba::rgb(0xAB, 0xCD, 0xEF)
        );
        assert!(slot.take().is_none());
    }

    #[test]
    fn debug_overlay_is_drawn() {
        let mut app = App::new(Rc::new(MemoryStore::new()));
        let mut surface = RecordingSurface::new(640, 480);
        app.set_debug(true);
        app.update(&mut ScriptedSource::new(), Duration::from_millis(10));
        app.draw(&mut surface, 12.0);
        let texts = surface.texts();
        assert!(texts.contains(&"12"));
        assert!(texts.iter().any(|t| t.starts_with("fps: ")));
    }
}
