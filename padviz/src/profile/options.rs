//! Declared, user-configurable drawing options and their resolved values.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::render::surface::Rgba;
use crate::store::user_profiles::UserProfile;

/// Global option merged into every device's effective options
pub const DRAW_ALPHA_MASK: &str = "drawAlphaMask";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OptionKind {
    Color,
    Checkbox,
    Text,
}

impl OptionKind {
    pub fn accepts(self, value: &OptionValue) -> bool {
        match (self, value) {
            (OptionKind::Checkbox, OptionValue::Bool(_)) => true,
            (OptionKind::Text, OptionValue::Text(_)) => true,
            (OptionKind::Color, OptionValue::Text(hex)) => {
                Rgba::from_hex(hex).is_some()
            }
            _ => false,
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OptionKind::Color => "COLOR",
            OptionKind::Checkbox => "CHECKBOX",
            OptionKind::Text => "TEXT",
        })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Text(String),
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        if let OptionValue::Bool(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let OptionValue::Text(v) = self {
            Some(v)
        } else {
            None
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(v) => write!(f, "{}", v),
            OptionValue::Text(v) => f.write_str(v),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OptionDefault {
    Color(&'static str),
    Checkbox(bool),
    Text(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OptionDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub default: OptionDefault,
}

impl OptionDescriptor {
    pub const fn color(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        hex: &'static str,
    ) -> Self {
        Self {
            id,
            name,
            description,
            default: OptionDefault::Color(hex),
        }
    }

    pub const fn checkbox(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        checked: bool,
    ) -> Self {
        Self {
            id,
            name,
            description,
            default: OptionDefault::Checkbox(checked),
        }
    }

    pub const fn text(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        text: &'static str,
    ) -> Self {
        Self {
            id,
            name,
            description,
            default: OptionDefault::Text(text),
        }
    }

    pub fn kind(&self) -> OptionKind {
        match self.default {
            OptionDefault::Color(_) => OptionKind::Color,
            OptionDefault::Checkbox(_) => OptionKind::Checkbox,
            OptionDefault::Text(_) => OptionKind::Text,
        }
    }

    pub fn default_value(&self) -> OptionValue {
        match self.default {
            OptionDefault::Color(hex) => OptionValue::from(hex),
            OptionDefault::Checkbox(checked) => OptionValue::from(checked),
            OptionDefault::Text(text) => OptionValue::from(text),
        }
    }
}

/// Global options overlaid by one device's user profile.
///
/// User profile values take precedence over global values for overlapping
/// keys. Lookups of missing or ill-typed values fall back to the declared
/// default.
#[derive(Clone, Debug)]
pub struct EffectiveOptions {
    declared: &'static [OptionDescriptor],
    values: IndexMap<String, OptionValue>,
}

impl EffectiveOptions {
    pub fn merge(
        declared: &'static [OptionDescriptor],
        global: &IndexMap<String, OptionValue>,
        user_profile: &UserProfile,
    ) -> Self {
        let mut values = global.clone();
        for (id, value) in user_profile.options() {
            values.insert(id.clone(), value.clone());
        }
        Self { declared, values }
    }

    pub fn get(&self, id: &str) -> Option<&OptionValue> {
        self.values.get(id)
    }

    pub fn alpha_mask(&self) -> bool {
        self.values
            .get(DRAW_ALPHA_MASK)
            .and_then(OptionValue::as_bool)
            .unwrap_or(false)
    }

    /// Resolved color. Every color is opaque white in alpha mask mode.
    pub fn color(&self, id: &str) -> Rgba {
        if self.alpha_mask() {
            return Rgba::WHITE;
        }
        self.values
            .get(id)
            .and_then(OptionValue::as_str)
            .and_then(Rgba::from_hex)
            .or_else(|| {
                self.descriptor(id).and_then(|d| match d.default {
                    OptionDefault::Color(hex) => Rgba::from_hex(hex),
                    _ => None,
                })
            })
            .unwrap_or(Rgba::BLACK)
    }

    pub fn flag(&self, id: &str) -> bool {
        self.values
            .get(id)
            .and_then(OptionValue::as_bool)
            .or_else(|| {
                self.descriptor(id).and_then(|d| match d.default {
                    OptionDefault::Checkbox(checked) => Some(checked),
                    _ => None,
                })
            })
            .unwrap_or(false)
    }

    pub fn text(&self, id: &str) -> &str {
        self.values
            .get(id)
            .and_then(OptionValue::as_str)
            .or_else(|| {
                self.descriptor(id).and_then(|d| match d.default {
                    OptionDefault::Text(text) => Some(text),
                    _ => None,
                })
            })
            .unwrap_or("")
    }

    fn descriptor(&self, id: &str) -> Option<&'static OptionDescriptor> {
        self.declared.iter().find(|d| d.id == id)
    }
}
