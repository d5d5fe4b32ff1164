//! Release history records and edits.
//!
//! A history is keyed by release version. It is seeded with the release
//! shipped inside the binary, grows by one entry per published update, and
//! lets existing entries be toggled (enabled, mandatory, rollout) in place.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{CodePushError, Result};

/// A single entry of the release history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInfo {
    pub enabled: bool,
    pub mandatory: bool,
    pub download_url: String,
    pub package_hash: String,
    /// Rollout percentage, stored as published. Not interpreted here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollout: Option<u8>,
}

impl ReleaseInfo {
    /// Entry describing the bundle shipped inside the binary.
    pub fn binary() -> Self {
        Self {
            enabled: true,
            mandatory: false,
            download_url: String::new(),
            package_hash: String::new(),
            rollout: None,
        }
    }
}

/// Version string to release info.
pub type ReleaseHistory = BTreeMap<String, ReleaseInfo>;

/// New history holding only the binary release for `binary_version`.
pub fn create(binary_version: impl Into<String>) -> ReleaseHistory {
    let mut history = ReleaseHistory::new();
    history.insert(binary_version.into(), ReleaseInfo::binary());
    history
}

/// Record a newly published release.
///
/// Fails with `AlreadyReleased` if `version` is already in the history; the
/// existing entry is left untouched.
pub fn add_release(
    history: &mut ReleaseHistory,
    version: impl Into<String>,
    info: ReleaseInfo,
) -> Result<()> {
    let version = version.into();
    if history.contains_key(&version) {
        return Err(CodePushError::AlreadyReleased(version));
    }

    debug!(version = %version, enabled = info.enabled, mandatory = info.mandatory, "adding release");
    history.insert(version, info);
    Ok(())
}

/// Patch flags on an existing release. `None` leaves a field unchanged.
pub fn update_release(
    history: &mut ReleaseHistory,
    version: &str,
    mandatory: Option<bool>,
    enabled: Option<bool>,
    rollout: Option<u8>,
) -> Result<()> {
    let info = history
        .get_mut(version)
        .ok_or_else(|| CodePushError::NotReleased(version.to_string()))?;

    if let Some(mandatory) = mandatory {
        info.mandatory = mandatory;
    }
    if let Some(enabled) = enabled {
        info.enabled = enabled;
    }
    if let Some(rollout) = rollout {
        info.rollout = Some(rollout);
    }

    debug!(version, "updated release");
    Ok(())
}

/// Parse a JSON release history.
pub fn from_json(raw: &str) -> Result<ReleaseHistory> {
    Ok(serde_json::from_str(raw)?)
}

/// Serialize a release history to JSON.
pub fn to_json(history: &ReleaseHistory) -> Result<String> {
    Ok(serde_json::to_string(history)?)
}
