use serde::{Deserialize, Serialize};

use crate::error::{MergeError, MergeResult};

/// How identity keys are looked up in the original tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// Pre-order scan of the whole tree per lookup.
    #[default]
    Linear,
    /// Hash map built once per merge, in document order.
    Keyed,
}

/// Markup conventions and engine options for a merge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Attribute holding the stable identity key.
    pub identity_attribute: String,
    /// Attribute holding the stored content fingerprint.
    pub fingerprint_attribute: String,
    /// Tag of the element that marks where new content goes.
    pub placeholder_tag: String,
    /// Attributes starting with this prefix are tool bookkeeping and are
    /// ignored when comparing elements.
    pub internal_prefix: String,
    /// Copy attributes present on the proposed root but missing from the
    /// original root (namespace declarations, mostly).
    pub sync_root_attributes: bool,
    /// Identity lookup strategy.
    pub index: IndexKind,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            identity_attribute: "id".to_string(),
            fingerprint_attribute: "z".to_string(),
            placeholder_tag: "util:placeholder".to_string(),
            internal_prefix: "_".to_string(),
            sync_root_attributes: false,
            index: IndexKind::Linear,
        }
    }
}

impl MergeConfig {
    /// Parse from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> MergeResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot work with.
    pub fn validate(&self) -> MergeResult<()> {
        if self.identity_attribute.is_empty() {
            return Err(MergeError::InvalidConfig("identity_attribute is empty".into()));
        }
        if self.fingerprint_attribute.is_empty() {
            return Err(MergeError::InvalidConfig("fingerprint_attribute is empty".into()));
        }
        if self.placeholder_tag.is_empty() {
            return Err(MergeError::InvalidConfig("placeholder_tag is empty".into()));
        }
        if self.identity_attribute == self.fingerprint_attribute {
            return Err(MergeError::InvalidConfig(format!(
                "identity and fingerprint attribute are both `{}`",
                self.identity_attribute
            )));
        }
        if self.is_internal(&self.identity_attribute) {
            return Err(MergeError::InvalidConfig(format!(
                "identity attribute `{}` carries the internal prefix",
                self.identity_attribute
            )));
        }
        Ok(())
    }

    /// Returns `true` for tool-internal attribute names.
    pub fn is_internal(&self, name: &str) -> bool {
        !self.internal_prefix.is_empty() && name.starts_with(&self.internal_prefix)
    }

    /// Returns `true` for attributes excluded from equivalence: the
    /// fingerprint itself and internal attributes.
    pub fn is_bookkeeping(&self, name: &str) -> bool {
        name == self.fingerprint_attribute || self.is_internal(name)
    }
}
