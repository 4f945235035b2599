//! Named user option sets, scoped per visualization profile, with "last
//! used" tracking and durable persistence.

use std::rc::Rc;

use indexmap::IndexMap;
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::{Error, Result};
use crate::profile::VisualizationProfile;
use crate::profile::options::OptionValue;
use crate::runtime::storage::KeyValueStore;

/// Storage key holding the whole store as one JSON document
pub const STORAGE_KEY: &str = "userProfiles";

const PROFILE_NAME_FIELD: &str = "profileName";

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct UserProfile {
    #[serde(rename = "profileName")]
    profile_name: String,
    #[serde(flatten)]
    options: IndexMap<String, OptionValue>,
}

impl UserProfile {
    /// A profile with a name and no option values
    pub fn new(profile_name: impl Into<String>) -> Self {
        Self {
            profile_name: profile_name.into(),
            options: IndexMap::new(),
        }
    }

    pub fn profile_name(&self) -> &str {
        &self.profile_name
    }

    pub fn set_profile_name(&mut self, profile_name: impl Into<String>) {
        self.profile_name = profile_name.into();
    }

    pub fn options(&self) -> &IndexMap<String, OptionValue> {
        &self.options
    }

    pub fn get(&self, id: &str) -> Option<&OptionValue> {
        self.options.get(id)
    }

    pub fn set(&mut self, id: impl Into<String>, value: OptionValue) {
        self.options.insert(id.into(), value);
    }

    /// Drop every value that is not a well-typed declared option of
    /// `profile`. Returns the number of values removed.
    pub fn prune_to(&mut self, profile: VisualizationProfile) -> usize {
        let before = self.options.len();
        self.options.retain(|id, value| {
            profile
                .option(id)
                .is_some_and(|descriptor| descriptor.kind().accepts(value))
        });
        before - self.options.len()
    }

    /// Build a profile from an uploaded JSON document. Only `profileName`
    /// and the declared options of `profile` are read; anything else
    /// (including export metadata) is ignored.
    pub fn from_json(
        profile: VisualizationProfile,
        json: &Value,
    ) -> Result<Self> {
        let object = json.as_object().ok_or_else(|| {
            Error::MalformedProfile("expected a JSON object".to_string())
        })?;

        let profile_name = object
            .get(PROFILE_NAME_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::MalformedProfile(format!(
                    "missing string field '{}'",
                    PROFILE_NAME_FIELD
                ))
            })?;

        let mut user_profile = Self::new(profile_name);
        for descriptor in profile.options() {
            let Some(raw) = object.get(descriptor.id) else {
                continue;
            };
            match serde_json::from_value::<OptionValue>(raw.clone()) {
                Ok(value) if descriptor.kind().accepts(&value) => {
                    user_profile.set(descriptor.id, value);
                }
                _ => warn!(
                    "Ignoring {} value {} for option '{}'",
                    descriptor.kind(),
                    raw,
                    descriptor.id
                ),
            }
        }

        Ok(user_profile)
    }
}

#[derive(Clone, Debug)]
struct ProfileSet {
    default: UserProfile,
    profiles: IndexMap<String, UserProfile>,
    last_used: Option<String>,
}

impl ProfileSet {
    fn new(profile: VisualizationProfile) -> Self {
        Self {
            default: profile.default_user_profile(),
            profiles: IndexMap::new(),
            last_used: None,
        }
    }

    fn get(&self, name: &str) -> Option<&UserProfile> {
        self.profiles.get(name).or_else(|| {
            (self.default.profile_name() == name).then_some(&self.default)
        })
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct PersistedProfileSet {
    profiles: Vec<UserProfile>,
    #[serde(rename = "lastUsed", default)]
    last_used: Option<String>,
}

/// Registry of user profiles keyed by (visualization profile, profile name).
///
/// Every known visualization profile has a designated default that cannot be
/// removed; a stored profile with the default's name shadows it for named
/// lookups only. Every mutation writes the whole store through to the
/// backing [`KeyValueStore`] before returning. Write failures are logged
/// and otherwise ignored.
pub struct UserProfileStore {
    backend: Rc<dyn KeyValueStore>,
    sets: IndexMap<VisualizationProfile, ProfileSet>,
}

impl UserProfileStore {
    /// An empty store (defaults only) writing to `backend`
    pub fn new(backend: Rc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            sets: VisualizationProfile::ALL
                .into_iter()
                .map(|profile| (profile, ProfileSet::new(profile)))
                .collect(),
        }
    }

    /// Restore the store persisted in `backend`. Unreadable content is
    /// logged and replaced by an empty store.
    pub fn load(backend: Rc<dyn KeyValueStore>) -> Self {
        let json = backend.get(STORAGE_KEY);
        let mut store = Self::new(backend);

        let Some(json) = json else {
            return store;
        };

        let persisted = match serde_json::from_str::<
            IndexMap<String, PersistedProfileSet>,
        >(&json)
        {
            Ok(persisted) => persisted,
            Err(err) => {
                warn!("Discarding unreadable user profiles: {}", err);
                return store;
            }
        };

        for (name, persisted_set) in persisted {
            let Some(profile) = VisualizationProfile::from_name(&name) else {
                warn!("Skipping user profiles of unknown profile '{}'", name);
                continue;
            };
            let Some(set) = store.sets.get_mut(&profile) else {
                continue;
            };
            for mut user_profile in persisted_set.profiles {
                let pruned = user_profile.prune_to(profile);
                if pruned > 0 {
                    debug!(
                        "Pruned {} stale option(s) from '{}' ({})",
                        pruned,
                        user_profile.profile_name(),
                        profile
                    );
                }
                let name = user_profile.profile_name().to_string();
                set.profiles.insert(name, user_profile);
            }
            set.last_used = persisted_set
                .last_used
                .filter(|name| set.get(name).is_some());
        }

        store
    }

    /// Exact lookup by profile name
    pub fn user_profile(
        &self,
        profile: VisualizationProfile,
        name: &str,
    ) -> Option<&UserProfile> {
        self.sets.get(&profile).and_then(|set| set.get(name))
    }

    /// The designated default of `profile`
    pub fn default_profile(
        &self,
        profile: VisualizationProfile,
    ) -> Result<&UserProfile> {
        self.sets
            .get(&profile)
            .map(|set| &set.default)
            .ok_or_else(|| Error::MissingDefault {
                profile: profile.name().to_string(),
            })
    }

    /// The default (or the stored profile shadowing it) followed by every
    /// other stored profile in insertion order
    pub fn user_profiles(
        &self,
        profile: VisualizationProfile,
    ) -> Vec<&UserProfile> {
        let Some(set) = self.sets.get(&profile) else {
            return Vec::new();
        };
        let default_name = set.default.profile_name();
        let first = set.profiles.get(default_name).unwrap_or(&set.default);
        let mut out = vec![first];
        out.extend(
            set.profiles
                .values()
                .filter(|p| p.profile_name() != default_name),
        );
        out
    }

    pub fn last_used(
        &self,
        profile: VisualizationProfile,
    ) -> Option<&UserProfile> {
        let set = self.sets.get(&profile)?;
        set.last_used.as_deref().and_then(|name| set.get(name))
    }

    /// Insert or replace by profile name and mark it last used. Returns
    /// whether the stored content differs from before.
    pub fn add_or_update(
        &mut self,
        profile: VisualizationProfile,
        mut user_profile: UserProfile,
    ) -> bool {
        user_profile.prune_to(profile);
        let set = self
            .sets
            .entry(profile)
            .or_insert_with(|| ProfileSet::new(profile));

        let name = user_profile.profile_name().to_string();
        let changed = set.get(&name) != Some(&user_profile);
        set.profiles.insert(name.clone(), user_profile);
        set.last_used = Some(name);

        self.persist();
        changed
    }

    /// Mark a resolvable profile as last used. Returns `false` on a miss.
    pub fn activate(
        &mut self,
        profile: VisualizationProfile,
        name: &str,
    ) -> bool {
        let Some(set) = self.sets.get_mut(&profile) else {
            return false;
        };
        if set.get(name).is_none() {
            return false;
        }
        set.last_used = Some(name.to_string());
        self.persist();
        true
    }

    pub fn remove(
        &mut self,
        profile: VisualizationProfile,
        user_profile: &UserProfile,
    ) {
        let Some(set) = self.sets.get_mut(&profile) else {
            return;
        };
        let name = user_profile.profile_name();
        set.profiles.shift_remove(name);
        if set.last_used.as_deref() == Some(name) {
            set.last_used = None;
        }
        self.persist();
    }

    /// Forget every stored profile and last-used choice
    pub fn reset(&mut self) {
        for (profile, set) in self.sets.iter_mut() {
            *set = ProfileSet::new(*profile);
        }
        self.persist();
    }

    pub fn to_json(&self) -> Result<String> {
        let persisted: IndexMap<&str, PersistedProfileSet> = self
            .sets
            .iter()
            .filter(|(_, set)| {
                !set.profiles.is_empty() || set.last_used.is_some()
            })
            .map(|(profile, set)| {
                (
                    profile.name(),
                    PersistedProfileSet {
                        profiles: set.profiles.values().cloned().collect(),
                        last_used: set.last_used.clone(),
                    },
                )
            })
            .collect();
        Ok(serde_json::to_string(&persisted)?)
    }

    fn persist(&self) {
        let result = self
            .to_json()
            .and_then(|json| self.backend.set(STORAGE_KEY, &json));
        if let Err(err) = result {
            error!("Failed to persist user profiles: {}", err);
        }
    }
}
