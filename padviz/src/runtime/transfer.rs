//! Moving user profiles in and out as JSON files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::{info, warn};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::error::{Error, Result};
use crate::profile::VisualizationProfile;
use crate::store::user_profiles::UserProfile;

pub const GAMEPAD_ID_FIELD: &str = "gamepadId";
pub const VISUALIZATION_PROFILE_FIELD: &str = "visualizationProfile";

const UNNAMED: &str = "Unknown";

/// A user profile ready to be saved, with the device identity it was
/// exported from
#[derive(Clone, Debug, PartialEq)]
pub struct ExportedProfile {
    pub file_name: String,
    pub document: Value,
}

impl ExportedProfile {
    pub fn new(
        device_id: &str,
        profile: VisualizationProfile,
        user_profile: &UserProfile,
    ) -> Self {
        let name = match user_profile.profile_name() {
            "" => UNNAMED,
            name => name,
        };
        let file_name = format!(
            "{}-{}-{}.json",
            file_name_part(device_id),
            file_name_part(profile.name()),
            file_name_part(name)
        );

        let mut document = Map::new();
        document.insert(
            "profileName".to_string(),
            Value::from(user_profile.profile_name()),
        );
        for descriptor in profile.options() {
            let value = user_profile
                .get(descriptor.id)
                .cloned()
                .unwrap_or_else(|| descriptor.default_value());
            document.insert(descriptor.id.to_string(), json_value(&value));
        }
        document.insert(GAMEPAD_ID_FIELD.to_string(), Value::from(device_id));
        document.insert(
            VISUALIZATION_PROFILE_FIELD.to_string(),
            Value::from(profile.name()),
        );

        Self {
            file_name,
            document: Value::Object(document),
        }
    }

    /// The document indented by four spaces
    pub fn to_pretty_json(&self) -> Result<String> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut out, formatter);
        self.document.serialize(&mut serializer)?;
        String::from_utf8(out).map_err(|e| Error::Storage(e.to_string()))
    }

    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        fs::write(&path, self.to_pretty_json()?)?;
        info!("Exported user profile to {}", path.display());
        Ok(path)
    }
}

fn json_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// `s` with everything but ASCII alphanumerics and `._()-` replaced by
/// `_`, so host-supplied ids never add path components
fn file_name_part(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || "._()-".contains(c) {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Holds at most one parsed upload until the next import consumes it.
///
/// Files are read and parsed on a worker thread; the result lands in the
/// slot on the next [`ImportSlot::poll`]. Failures clear the slot.
#[derive(Debug, Default)]
pub struct ImportSlot {
    staged: Option<Value>,
    pending: Option<Receiver<Result<Value>>>,
}

impl ImportSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start reading `path` in the background, replacing anything staged
    pub fn stage_file(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        let (tx, rx) = mpsc::channel();
        self.staged = None;
        self.pending = Some(rx);

        thread::spawn(move || {
            let result = fs::read_to_string(&path)
                .map_err(Error::from)
                .and_then(|text| parse(&text));
            let _ = tx.send(result);
        });
    }

    pub fn stage_str(&mut self, text: &str) {
        self.pending = None;
        self.settle(parse(text));
    }

    /// Collect a finished background read. Returns whether a document is
    /// staged afterwards.
    pub fn poll(&mut self) -> bool {
        if let Some(rx) = &self.pending {
            match rx.try_recv() {
                Ok(result) => {
                    self.pending = None;
                    self.settle(result);
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    warn!("Import reader stopped without a result");
                    self.pending = None;
                }
            }
        }
        self.staged.is_some()
    }

    /// Block until any background read finishes
    pub fn wait(&mut self) -> bool {
        if let Some(rx) = self.pending.take() {
            match rx.recv() {
                Ok(result) => self.settle(result),
                Err(_) => warn!("Import reader stopped without a result"),
            }
        }
        self.staged.is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn take(&mut self) -> Option<Value> {
        self.poll();
        self.staged.take()
    }

    fn settle(&mut self, result: Result<Value>) {
        match result {
            Ok(value) => self.staged = Some(value),
            Err(e) => {
                warn!("Discarding import: {}", e);
                self.staged = None;
            }
        }
    }
}

fn parse(text: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(Error::MalformedProfile(
            "expected a JSON object".to_string(),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::options::OptionValue;

    const PAD: &str = "045e-028e-Microsoft X-Box 360 pad";

    fn custom() -> UserProfile {
        let mut profile =
            VisualizationProfile::XboxFirefox.default_user_profile();
        profile.set_profile_name("My Stream");
        profile.set("colorBody", OptionValue::from("#000000"));
        profile
    }

    #[test]
    fn names_file_after_device_and_profiles() {
        let export = ExportedProfile::new(
            PAD,
            VisualizationProfile::XboxFirefox,
            &custom(),
        );
        assert_eq!(
            export.file_name,
            "045e-028e-Microsoft_X-Box_360_pad-XBox_One_360_Controller_\
             (Firefox)-My_Stream.json"
        );

        let unnamed = ExportedProfile::new(
            PAD,
            VisualizationProfile::Unknown,
            &UserProfile::new(""),
        );
        assert!(unnamed.file_name.ends_with("-Unknown.json"));
    }

    #[test]
    fn device_ids_cannot_escape_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let export = ExportedProfile::new(
            "Logitech Dual Action/USB (Vendor: 046d)",
            VisualizationProfile::Unknown,
            &UserProfile::new("Default"),
        );
        assert!(export.file_name.starts_with(
            "Logitech_Dual_Action_USB_(Vendor__046d)-"
        ));

        let escaping = ExportedProfile::new(
            "../..\\pad",
            VisualizationProfile::Unknown,
            &UserProfile::new("Default"),
        );
        assert!(!escaping.file_name.contains('/'));
        assert!(!escaping.file_name.contains('\\'));

        for export in [export, escaping] {
            let path = export.write_to(dir.path()).unwrap();
            assert_eq!(path.parent(), Some(dir.path()));
            assert!(path.is_file());
        }
    }

    #[test]
    fn document_carries_options_and_metadata() {
        let export = ExportedProfile::new(
            PAD,
            VisualizationProfile::XboxFirefox,
            &custom(),
        );
        let document = export.document.as_object().unwrap();

        assert_eq!(document["profileName"], "My Stream");
        assert_eq!(document["colorBody"], "#000000");
        assert_eq!(document["drawLabels"], true);
        assert_eq!(document[GAMEPAD_ID_FIELD], PAD);
        assert_eq!(
            document[VISUALIZATION_PROFILE_FIELD],
            VisualizationProfile::XboxFirefox.name()
        );

        let json = export.to_pretty_json().unwrap();
        assert!(json.starts_with("{\n    \"profileName\": \"My Stream\""));
    }

    #[test]
    fn writes_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let export = ExportedProfile::new(
            PAD,
            VisualizationProfile::XboxFirefox,
            &custom(),
        );
        let path = export.write_to(dir.path()).unwrap();
        let text = fs::read_to_string(path).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, export.document);
    }

    #[test]
    fn staged_file_arrives_through_worker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, r#"{ "profileName": "File" }"#).unwrap();

        let mut slot = ImportSlot::new();
        slot.stage_file(&path);
        assert!(slot.wait());
        assert_eq!(slot.take().unwrap()["profileName"], "File");
        assert!(slot.take().is_none());
    }

    #[test]
    fn failures_clear_the_slot() {
        let mut slot = ImportSlot::new();
        slot.stage_str(r#"{ "profileName": "Inline" }"#);
        assert!(slot.poll());

        slot.stage_str("not json");
        assert!(!slot.poll());

        slot.stage_str("[1, 2, 3]");
        assert!(slot.take().is_none());

        slot.stage_file("/definitely/not/here.json");
        assert!(!slot.wait());
    }
}
