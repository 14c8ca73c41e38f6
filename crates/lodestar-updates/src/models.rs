//! Core data models for the update client

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AttemptError, CheckFailure};

/// Update feed entry returned by `POST <server>/check-update`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateInfo {
    /// Latest published version
    #[serde(deserialize_with = "lenient::version")]
    pub new_version: String,
    /// Theme homepage
    #[serde(default, deserialize_with = "lenient::string")]
    pub url: String,
    /// Download URL of the release archive
    #[serde(default, deserialize_with = "lenient::string")]
    pub package: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    /// Minimum host version
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub requires: Option<String>,
    /// Host version the release was tested against
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub tested: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub requires_php: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<String>,
    /// Section name to HTML/text body (description, installation, ...)
    #[serde(
        default,
        deserialize_with = "lenient::sections",
        skip_serializing_if = "Option::is_none"
    )]
    pub sections: Option<BTreeMap<String, String>>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub changelog: Option<String>,
    /// Fields the server sent that this model does not name
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UpdateInfo {
    /// Build from a 200 response body, requiring a `new_version` key
    pub fn from_response(map: Map<String, Value>) -> Result<Self, AttemptError> {
        if !map.contains_key("new_version") {
            return Err(AttemptError::Malformed(
                "response has no new_version".to_string(),
            ));
        }

        serde_json::from_value(Value::Object(map))
            .map_err(|e| AttemptError::Malformed(e.to_string()))
    }

    /// Entry for the host's theme update list
    pub fn to_theme_update(&self, slug: &str) -> ThemeUpdate {
        ThemeUpdate {
            theme: slug.to_string(),
            new_version: self.new_version.clone(),
            url: self.url.clone(),
            package: self.package.clone(),
            requires: self.requires.clone(),
            requires_php: self.requires_php.clone(),
        }
    }

    /// Payload for the host's theme details dialog
    pub fn to_theme_information(&self, slug: &str, fallback_name: &str) -> ThemeInformation {
        let mut sections = self.sections.clone().unwrap_or_default();
        if let Some(changelog) = &self.changelog {
            sections
                .entry("changelog".to_string())
                .or_insert_with(|| changelog.clone());
        }

        ThemeInformation {
            name: self
                .name
                .clone()
                .unwrap_or_else(|| fallback_name.to_string()),
            slug: slug.to_string(),
            version: self.new_version.clone(),
            homepage: self.url.clone(),
            download_link: self.package.clone(),
            requires: self.requires.clone(),
            tested: self.tested.clone(),
            requires_php: self.requires_php.clone(),
            last_updated: self.last_updated.clone(),
            sections,
        }
    }
}

/// Theme update list entry understood by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeUpdate {
    pub theme: String,
    pub new_version: String,
    pub url: String,
    pub package: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_php: Option<String>,
}

/// Theme details dialog payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeInformation {
    pub name: String,
    pub slug: String,
    pub version: String,
    pub homepage: String,
    pub download_link: String,
    pub requires: Option<String>,
    pub tested: Option<String>,
    pub requires_php: Option<String>,
    pub last_updated: Option<String>,
    pub sections: BTreeMap<String, String>,
}

/// Outcome of an update check with failures kept distinct from "no update"
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateCheck {
    /// A strictly newer version is published
    UpdateAvailable(UpdateInfo),
    /// The feed answered and the installed version is current
    NoUpdateAvailable { latest_version: String },
    /// No usable answer
    CheckFailed(CheckFailure),
}

impl UpdateCheck {
    /// Collapse to the host-facing value: failures look like "no update"
    pub fn into_update(self) -> Option<UpdateInfo> {
        match self {
            UpdateCheck::UpdateAvailable(info) => Some(info),
            _ => None,
        }
    }

    pub fn is_update_available(&self) -> bool {
        matches!(self, UpdateCheck::UpdateAvailable(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, UpdateCheck::CheckFailed(_))
    }
}

/// Result of `POST <server>/license/validate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseValidation {
    pub valid: bool,
    pub message: String,
    /// Raw server payload of a successful validation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl LicenseValidation {
    pub fn valid(message: impl Into<String>, data: Value) -> Self {
        Self {
            valid: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Cached license state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LicenseStatus {
    /// No key configured
    Inactive { message: String },
    /// Server accepted the key
    Active { message: String },
    /// Server rejected the key or could not be reached
    Invalid { message: String },
}

impl LicenseStatus {
    pub fn inactive() -> Self {
        Self::Inactive {
            message: "No license key configured.".to_string(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Inactive { message } | Self::Active { message } | Self::Invalid { message } => {
                message
            }
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    /// Short lowercase name (`inactive`, `active`, `invalid`)
    pub fn label(&self) -> &'static str {
        match self {
            Self::Inactive { .. } => "inactive",
            Self::Active { .. } => "active",
            Self::Invalid { .. } => "invalid",
        }
    }
}

impl From<&LicenseValidation> for LicenseStatus {
    fn from(validation: &LicenseValidation) -> Self {
        let message = validation.message.clone();
        if validation.valid {
            Self::Active { message }
        } else {
            Self::Invalid { message }
        }
    }
}

/// Host lifecycle events the client reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// The active theme changed
    ThemeSwitched,
    /// An upgrade (of anything) finished
    UpgradeCompleted,
}

/// Deserializers that accept scalars where the feed is loose about types.
///
/// Only `new_version` is strict; optional fields of an unexpected shape
/// degrade to empty instead of failing the whole response.
mod lenient {
    use std::collections::BTreeMap;

    use serde::{de, Deserialize, Deserializer};
    use serde_json::Value;

    fn scalar(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn version<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        scalar(Value::deserialize(deserializer)?)
            .ok_or_else(|| de::Error::custom("new_version must be a string or number"))
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(scalar(Value::deserialize(deserializer)?).unwrap_or_default())
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(scalar(Value::deserialize(deserializer)?))
    }

    /// Object of string bodies; anything else (PHP's `[]` included) is `None`
    pub fn sections<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<BTreeMap<String, String>>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Object(map) => Ok(Some(
                map.into_iter()
                    .filter_map(|(name, body)| match body {
                        Value::String(body) => Some((name, body)),
                        _ => None,
                    })
                    .collect(),
            )),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_from_response_full_payload() {
        let info = UpdateInfo::from_response(object(json!({
            "new_version": "1.2.0",
            "url": "https://example.com/aurora",
            "package": "https://example.com/aurora-1.2.0.zip",
            "requires": "6.0",
            "tested": 6.4,
            "sections": {"description": "<p>Aurora</p>"},
            "changelog": "Fixed things",
            "download_count": 42
        })))
        .unwrap();

        assert_eq!(info.new_version, "1.2.0");
        assert_eq!(info.package, "https://example.com/aurora-1.2.0.zip");
        assert_eq!(info.tested.as_deref(), Some("6.4"));
        assert_eq!(info.extra["download_count"], 42);
    }

    #[test]
    fn test_from_response_minimal_payload() {
        let info = UpdateInfo::from_response(object(json!({"new_version": "2.0.0"}))).unwrap();
        assert_eq!(info.url, "");
        assert!(info.name.is_none());
        assert!(info.extra.is_empty());
    }

    #[test]
    fn test_numeric_version_is_accepted() {
        let info = UpdateInfo::from_response(object(json!({"new_version": 2.1}))).unwrap();
        assert_eq!(info.new_version, "2.1");
    }

    #[test]
    fn test_missing_new_version_is_malformed() {
        let err = UpdateInfo::from_response(object(json!({"version": "2.0.0"}))).unwrap_err();
        assert!(matches!(err, AttemptError::Malformed(_)));
    }

    #[test]
    fn test_null_new_version_is_malformed() {
        let err = UpdateInfo::from_response(object(json!({"new_version": null}))).unwrap_err();
        assert!(matches!(err, AttemptError::Malformed(_)));
    }

    #[test]
    fn test_empty_php_array_sections_are_ignored() {
        let info = UpdateInfo::from_response(object(json!({
            "new_version": "2.0.0",
            "package": "https://example.com/a.zip",
            "sections": []
        })))
        .unwrap();

        assert_eq!(info.new_version, "2.0.0");
        assert!(info.sections.is_none());
        assert!(info.to_theme_information("aurora", "Aurora").sections.is_empty());
    }

    #[test]
    fn test_non_string_section_bodies_are_dropped() {
        let info = UpdateInfo::from_response(object(json!({
            "new_version": "2.0.0",
            "sections": {"description": "<p>Aurora</p>", "screenshots": [1, 2]}
        })))
        .unwrap();

        let sections = info.sections.unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections["description"], "<p>Aurora</p>");
    }

    #[test]
    fn test_odd_optional_field_shapes_degrade_to_empty() {
        let info = UpdateInfo::from_response(object(json!({
            "new_version": "2.0.0",
            "url": {"href": "https://example.com"},
            "package": null,
            "requires": ["6.0"],
            "changelog": {}
        })))
        .unwrap();

        assert_eq!(info.url, "");
        assert_eq!(info.package, "");
        assert!(info.requires.is_none());
        assert!(info.changelog.is_none());
    }

    #[test]
    fn test_object_new_version_is_still_malformed() {
        let err =
            UpdateInfo::from_response(object(json!({"new_version": {"v": "2"}}))).unwrap_err();
        assert!(matches!(err, AttemptError::Malformed(_)));
    }

    #[test]
    fn test_extra_fields_survive_serialization() {
        let info = UpdateInfo::from_response(object(json!({
            "new_version": "1.0.1",
            "banner": "https://example.com/banner.png"
        })))
        .unwrap();

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["banner"], "https://example.com/banner.png");

        let back: UpdateInfo = serde_json::from_value(value).unwrap();
        assert_eq!(back, info);
    }

    #[test]
    fn test_theme_information_folds_changelog_into_sections() {
        let info = UpdateInfo::from_response(object(json!({
            "new_version": "1.3.0",
            "package": "https://example.com/a.zip",
            "changelog": "= 1.3.0 =\n* New header"
        })))
        .unwrap();

        let details = info.to_theme_information("aurora", "Aurora");
        assert_eq!(details.name, "Aurora");
        assert_eq!(details.download_link, "https://example.com/a.zip");
        assert_eq!(details.sections["changelog"], "= 1.3.0 =\n* New header");
    }

    #[test]
    fn test_into_update_hides_failures() {
        assert!(UpdateCheck::CheckFailed(CheckFailure::NoServers)
            .into_update()
            .is_none());
        assert!(UpdateCheck::NoUpdateAvailable {
            latest_version: "1.0.0".to_string()
        }
        .into_update()
        .is_none());
    }

    #[test]
    fn test_license_status_serialization_is_tagged() {
        let status = LicenseStatus::Active {
            message: "License is valid".to_string(),
        };
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value, json!({"status": "active", "message": "License is valid"}));

        let back: LicenseStatus = serde_json::from_value(value).unwrap();
        assert_eq!(back, status);
    }

    #[test]
    fn test_license_status_from_validation() {
        let rejected = LicenseValidation::invalid("Invalid key");
        let status = LicenseStatus::from(&rejected);
        assert_eq!(status.label(), "invalid");
        assert_eq!(status.message(), "Invalid key");

        let accepted = LicenseValidation::valid("ok", json!({}));
        assert!(LicenseStatus::from(&accepted).is_active());
    }
}
