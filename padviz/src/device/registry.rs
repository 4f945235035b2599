use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Write;

use log::{debug, warn};

use super::snapshot::DeviceSnapshot;
use crate::profile::{DEFAULT_USER_PROFILE_NAME, VisualizationProfile};
use crate::store::user_profiles::{UserProfile, UserProfileStore};

/// Registry state change for one device index
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Transition {
    Created(usize),
    Destroyed(usize),
}

/// One active device: its latest snapshot, the profile rendering it, and
/// the name of the user profile supplying its options.
///
/// The user profile is referenced by name and resolved through the store
/// on use, so every device sharing a (profile, name) pair sees the same
/// values.
#[derive(Clone, Debug)]
pub struct DeviceEntry {
    pub snapshot: DeviceSnapshot,
    pub visualization: VisualizationProfile,
    pub user_profile: String,
}

impl DeviceEntry {
    /// Pick a visualization profile and the user profile to start with
    pub fn resolve(snapshot: DeviceSnapshot, store: &UserProfileStore) -> Self {
        let visualization = VisualizationProfile::select(&snapshot);

        let user_profile = match store.last_used(visualization) {
            Some(profile) => profile.profile_name().to_string(),
            None => match store.default_profile(visualization) {
                Ok(profile) => profile.profile_name().to_string(),
                Err(err) => {
                    warn!("{}; using a name-only profile", err);
                    DEFAULT_USER_PROFILE_NAME.to_string()
                }
            },
        };

        Self {
            snapshot,
            visualization,
            user_profile,
        }
    }

    pub fn index(&self) -> usize {
        self.snapshot.index
    }

    /// The stored profile this entry names, else the profile default, else
    /// an empty profile carrying only the name
    pub fn user_profile<'a>(
        &self,
        store: &'a UserProfileStore,
    ) -> Cow<'a, UserProfile> {
        if let Some(profile) =
            store.user_profile(self.visualization, &self.user_profile)
        {
            return Cow::Borrowed(profile);
        }
        match store.default_profile(self.visualization) {
            Ok(profile) => Cow::Borrowed(profile),
            Err(err) => {
                warn!("{}", err);
                Cow::Owned(UserProfile::new(self.user_profile.clone()))
            }
        }
    }

    /// Every button and axis with its mapped label and current value
    pub fn input_report(&self) -> String {
        let mapping = self.visualization.mapping();
        let mut report = String::new();

        for (i, button) in self.snapshot.buttons.iter().enumerate() {
            let label = mapping.button(i).map_or("unmapped", |b| b.label());
            let _ = writeln!(
                report,
                "Button {} (->{}): {} (pressed: {}, touched: {})",
                i, label, button.value, button.pressed, button.touched
            );
        }

        for (i, axis) in self.snapshot.axes.iter().enumerate() {
            let label = mapping.axis(i).map_or("unmapped", |a| a.label());
            let _ = writeln!(report, "Axis {} (->{}): {}", i, label, axis);
        }

        report
    }
}

/// Active devices keyed by host slot index, iterated in index order
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    entries: BTreeMap<usize, DeviceEntry>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DeviceEntry> {
        self.entries.get(&index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut DeviceEntry> {
        self.entries.get_mut(&index)
    }

    pub fn entries(&self) -> impl Iterator<Item = &DeviceEntry> {
        self.entries.values()
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut DeviceEntry> {
        self.entries.values_mut()
    }

    /// Register a device, or refresh its snapshot if already active
    pub fn connect(
        &mut self,
        snapshot: DeviceSnapshot,
        store: &UserProfileStore,
    ) -> Option<Transition> {
        let index = snapshot.index;

        if let Some(entry) = self.entries.get_mut(&index) {
            entry.snapshot = snapshot;
            return None;
        }

        let entry = DeviceEntry::resolve(snapshot, store);
        debug!(
            "Device {} '{}' rendered by {} with user profile '{}'",
            index, entry.snapshot.id, entry.visualization, entry.user_profile
        );
        self.entries.insert(index, entry);
        Some(Transition::Created(index))
    }

    pub fn disconnect(&mut self, index: usize) -> Option<Transition> {
        self.entries.remove(&index).map(|entry| {
            debug!("Device {} '{}' removed", index, entry.snapshot.id);
            Transition::Destroyed(index)
        })
    }

    /// Reconcile with the slots reported by one poll. Observed indices are
    /// created or refreshed; active indices no longer observed are removed.
    pub fn apply_poll(
        &mut self,
        slots: Vec<Option<DeviceSnapshot>>,
        store: &UserProfileStore,
    ) -> Vec<Transition> {
        let mut transitions = Vec::new();
        let mut observed = Vec::new();

        for snapshot in slots.into_iter().flatten() {
            observed.push(snapshot.index);
            transitions.extend(self.connect(snapshot, store));
        }

        let stale: Vec<usize> = self
            .entries
            .keys()
            .copied()
            .filter(|index| !observed.contains(index))
            .collect();
        for index in stale {
            transitions.extend(self.disconnect(index));
        }

        transitions
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
