//! Parsing guide documents and fingerprinting their content.

use sha2::{Digest, Sha256};

use crate::error::ScriptError;
use crate::guide::CampaignGuide;
use crate::validate;

impl CampaignGuide {
    /// Parses and validates a YAML guide document.
    ///
    /// # Errors
    ///
    /// Returns `ScriptError::Parse` for malformed YAML and
    /// `ScriptError::Invalid` when the step graph is inconsistent.
    pub fn from_yaml_str(source: &str) -> Result<Self, ScriptError> {
        let guide: Self = serde_yaml::from_str(source)
            .map_err(|e| ScriptError::Parse(format!("yaml: {e}")))?;
        guide.checked()
    }

    /// Parses and validates a JSON guide document.
    ///
    /// # Errors
    ///
    /// Returns `ScriptError::Parse` for malformed JSON and
    /// `ScriptError::Invalid` when the step graph is inconsistent.
    pub fn from_json_str(source: &str) -> Result<Self, ScriptError> {
        let guide: Self = serde_json::from_str(source)
            .map_err(|e| ScriptError::Parse(format!("json: {e}")))?;
        guide.checked()
    }

    /// Hex SHA-256 of the canonical JSON form of this guide.
    ///
    /// Two guides with the same hash interpret any input log identically.
    #[must_use]
    pub fn version_hash(&self) -> String {
        // Serialization of derived Serialize types with string/enum keys is infallible.
        let canonical = serde_json::to_vec(self).expect("CampaignGuide serialization is infallible");
        format!("{:x}", Sha256::digest(&canonical))
    }

    fn checked(self) -> Result<Self, ScriptError> {
        let issues = validate::validate(&self);
        for warning in issues.iter().filter(|i| !i.is_fatal()) {
            tracing::warn!(guide_id = %self.id, "{warning}");
        }
        let fatal: Vec<String> = issues
            .iter()
            .filter(|i| i.is_fatal())
            .map(ToString::to_string)
            .collect();
        if fatal.is_empty() {
            Ok(self)
        } else {
            Err(ScriptError::Invalid {
                guide_id: self.id,
                issues: fatal,
            })
        }
    }
}
