//! Visualization profiles: one rendering strategy per controller family.
//!
//! Profiles are a closed set chosen once per device on connect (see
//! [`VisualizationProfile::select`]). They are plain `Copy` values with no
//! state; everything that varies per user lives in
//! [`crate::store::user_profiles::UserProfile`].

pub mod mapping;
pub mod options;
mod unknown;
mod xbox;

use std::fmt;

use log::{debug, warn};

use crate::device::snapshot::DeviceSnapshot;
use crate::render::surface::{Point, Size, Surface};
use crate::store::user_profiles::UserProfile;

pub use mapping::{Input, InputReader, Mapping};
use options::{EffectiveOptions, OptionDescriptor};

/// Profile name given to every generated default user profile
pub const DEFAULT_USER_PROFILE_NAME: &str = "Default";

const XBOX_CHROMIUM_MIN_BUTTONS: usize = 17;
const XBOX_CHROMIUM_MIN_AXES: usize = 4;
const XBOX_FIREFOX_MIN_BUTTONS: usize = 11;
const XBOX_FIREFOX_MIN_AXES: usize = 8;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum VisualizationProfile {
    XboxChromium,
    XboxFirefox,
    Unknown,
}

impl VisualizationProfile {
    /// Every profile, in selection priority order. The fallback is last.
    pub const ALL: [VisualizationProfile; 3] = [
        VisualizationProfile::XboxChromium,
        VisualizationProfile::XboxFirefox,
        VisualizationProfile::Unknown,
    ];

    /// Known-controller profiles in selection priority order
    pub const KNOWN: [VisualizationProfile; 2] = [
        VisualizationProfile::XboxChromium,
        VisualizationProfile::XboxFirefox,
    ];

    pub fn name(self) -> &'static str {
        match self {
            VisualizationProfile::XboxChromium => {
                "XBox One 360 Controller (Chromium)"
            }
            VisualizationProfile::XboxFirefox => {
                "XBox One 360 Controller (Firefox)"
            }
            VisualizationProfile::Unknown => "Unknown Controller",
        }
    }

    /// Parse a persisted or user-supplied profile name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Strict identity match used for automatic selection
    pub fn is_supported(self, snapshot: &DeviceSnapshot) -> bool {
        match self {
            VisualizationProfile::XboxChromium => {
                xbox::id_matches_chromium(&snapshot.id)
            }
            VisualizationProfile::XboxFirefox => {
                xbox::id_matches_firefox(&snapshot.id)
            }
            VisualizationProfile::Unknown => true,
        }
    }

    /// Structural compatibility, used when no identity matches
    pub fn can_be_supported(self, snapshot: &DeviceSnapshot) -> bool {
        let (buttons, axes) = (snapshot.buttons.len(), snapshot.axes.len());
        match self {
            VisualizationProfile::XboxChromium => {
                buttons >= XBOX_CHROMIUM_MIN_BUTTONS
                    && axes >= XBOX_CHROMIUM_MIN_AXES
            }
            VisualizationProfile::XboxFirefox => {
                buttons >= XBOX_FIREFOX_MIN_BUTTONS
                    && axes >= XBOX_FIREFOX_MIN_AXES
            }
            VisualizationProfile::Unknown => true,
        }
    }

    /// Identity match first, then structural match, then the fallback.
    pub fn select(snapshot: &DeviceSnapshot) -> Self {
        if let Some(profile) =
            Self::KNOWN.into_iter().find(|p| p.is_supported(snapshot))
        {
            debug!("'{}' is supported by {}", snapshot.id, profile);
            return profile;
        }

        if let Some(profile) =
            Self::KNOWN.into_iter().find(|p| p.can_be_supported(snapshot))
        {
            debug!("'{}' can be supported by {}", snapshot.id, profile);
            return profile;
        }

        warn!(
            "No visualization profile can render '{}'; using {}",
            snapshot.id,
            VisualizationProfile::Unknown
        );
        VisualizationProfile::Unknown
    }

    /// Every profile able to render `snapshot`, in priority order
    pub fn candidates(snapshot: &DeviceSnapshot) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|p| p.can_be_supported(snapshot))
            .collect()
    }

    pub fn options(self) -> &'static [OptionDescriptor] {
        match self {
            VisualizationProfile::XboxChromium
            | VisualizationProfile::XboxFirefox => &xbox::OPTIONS,
            VisualizationProfile::Unknown => &unknown::OPTIONS,
        }
    }

    pub fn option(self, id: &str) -> Option<&'static OptionDescriptor> {
        self.options().iter().find(|d| d.id == id)
    }

    pub fn mapping(self) -> &'static Mapping {
        match self {
            VisualizationProfile::XboxChromium => &xbox::CHROMIUM_MAPPING,
            VisualizationProfile::XboxFirefox => &xbox::FIREFOX_MAPPING,
            VisualizationProfile::Unknown => &Mapping::EMPTY,
        }
    }

    pub fn draw_size(self) -> Size {
        match self {
            VisualizationProfile::XboxChromium
            | VisualizationProfile::XboxFirefox => xbox::DRAW_SIZE,
            VisualizationProfile::Unknown => unknown::DRAW_SIZE,
        }
    }

    /// Render the glyph centered at `center`
    pub fn draw(
        self,
        surface: &mut dyn Surface,
        center: Point,
        snapshot: &DeviceSnapshot,
        options: &EffectiveOptions,
    ) {
        match self {
            VisualizationProfile::XboxChromium
            | VisualizationProfile::XboxFirefox => {
                xbox::draw(surface, center, self.mapping(), snapshot, options)
            }
            VisualizationProfile::Unknown => {
                unknown::draw(surface, center, snapshot, options)
            }
        }
    }

    /// A user profile holding every declared option at its default value
    pub fn default_user_profile(self) -> UserProfile {
        let mut profile = UserProfile::new(DEFAULT_USER_PROFILE_NAME);
        for descriptor in self.options() {
            profile.set(descriptor.id, descriptor.default_value());
        }
        profile
    }
}

impl fmt::Display for VisualizationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::surface::RecordingSurface;
    use indexmap::IndexMap;

    fn snapshot(id: &str, buttons: usize, axes: usize) -> DeviceSnapshot {
        DeviceSnapshot::with_layout(0, id, buttons, axes)
    }

    #[test]
    fn identity_match_wins_over_structure() {
        let pad = snapshot("045e-028e-Microsoft X-Box 360 pad", 17, 4);
        assert_eq!(
            VisualizationProfile::select(&pad),
            VisualizationProfile::XboxFirefox
        );
    }

    #[test]
    fn structural_match_follows_priority_order() {
        let pad = snapshot("Some Generic Pad", 17, 8);
        assert_eq!(
            VisualizationProfile::select(&pad),
            VisualizationProfile::XboxChromium
        );

        let pad = snapshot("Some Generic Pad", 12, 8);
        assert_eq!(
            VisualizationProfile::select(&pad),
            VisualizationProfile::XboxFirefox
        );
    }

    #[test]
    fn unmatched_snapshot_falls_back_to_unknown() {
        let pad = snapshot("Flight Stick", 3, 2);
        assert_eq!(
            VisualizationProfile::select(&pad),
            VisualizationProfile::Unknown
        );
        assert_eq!(
            VisualizationProfile::candidates(&pad),
            vec![VisualizationProfile::Unknown]
        );
    }

    #[test]
    fn names_round_trip() {
        for profile in VisualizationProfile::ALL {
            assert_eq!(
                VisualizationProfile::from_name(profile.name()),
                Some(profile)
            );
        }
        assert_eq!(VisualizationProfile::from_name("nope"), None);
    }

    #[test]
    fn default_user_profile_declares_every_option() {
        for profile in VisualizationProfile::ALL {
            let defaults = profile.default_user_profile();
            let keys: Vec<&str> =
                defaults.options().keys().map(String::as_str).collect();
            let declared: Vec<&str> =
                profile.options().iter().map(|d| d.id).collect();
            assert_eq!(keys, declared);
        }
    }

    #[test]
    fn draw_is_repeatable() {
        let mut pad = snapshot("045e-028e-Microsoft X-Box 360 pad", 11, 8);
        pad.set_axis(2, 1.0);
        let profile = VisualizationProfile::select(&pad);
        let options = EffectiveOptions::merge(
            profile.options(),
            &IndexMap::new(),
            &profile.default_user_profile(),
        );
        let mut surface = RecordingSurface::new(800, 600);

        profile.draw(&mut surface, Point::new(400.0, 300.0), &pad, &options);
        let first = surface.take_commands();
        profile.draw(&mut surface, Point::new(400.0, 300.0), &pad, &options);
        let second = surface.take_commands();

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }
}
