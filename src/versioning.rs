//! Release history evaluation.
//!
//! A release history maps version strings to [`ReleaseInfo`]. The oldest
//! entry is the release shipped with the binary. [`ReleaseVersioning`] sorts
//! the history newest-first under a [`VersionScheme`] and answers the
//! questions an update check needs: which release is latest, whether the
//! update is mandatory, and whether the running bundle must be rolled back.

use std::marker::PhantomData;

use crate::error::{CodePushError, Result};
use crate::history::{ReleaseHistory, ReleaseInfo};

/// How version strings are parsed and ordered.
pub trait VersionScheme {
    type Version: Ord + Clone;

    fn parse(raw: &str) -> Result<Self::Version>;
}

/// Semantic versions (`1.2.3`, `v1.2.3`, `1.2.0-rc.1`).
///
/// Build metadata is dropped, so `1.0.0+a` and `1.0.0+b` order as equal.
#[derive(Debug, Clone, Copy)]
pub struct Semver;

impl VersionScheme for Semver {
    type Version = semver::Version;

    fn parse(raw: &str) -> Result<Self::Version> {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

        let mut version =
            semver::Version::parse(trimmed).map_err(|e| CodePushError::InvalidVersion {
                version: raw.to_string(),
                reason: e.to_string(),
            })?;
        version.build = semver::BuildMetadata::EMPTY;
        Ok(version)
    }
}

/// Plain increasing integers (`1`, `2`, `3`).
#[derive(Debug, Clone, Copy)]
pub struct Incremental;

impl VersionScheme for Incremental {
    type Version = u64;

    fn parse(raw: &str) -> Result<Self::Version> {
        raw.trim()
            .parse::<u64>()
            .map_err(|e| CodePushError::InvalidVersion {
                version: raw.to_string(),
                reason: e.to_string(),
            })
    }
}

pub type SemverVersioning = ReleaseVersioning<Semver>;
pub type IncrementalVersioning = ReleaseVersioning<Incremental>;

struct Release<V> {
    version: V,
    label: String,
    info: ReleaseInfo,
}

/// A release history sorted newest-first.
pub struct ReleaseVersioning<S: VersionScheme> {
    releases: Vec<Release<S::Version>>,
    _scheme: PhantomData<S>,
}

impl<S: VersionScheme> ReleaseVersioning<S> {
    /// Sort `history`. Fails if any version string does not parse.
    pub fn new(history: ReleaseHistory) -> Result<Self> {
        let mut releases = history
            .into_iter()
            .map(|(label, info)| {
                Ok(Release {
                    version: S::parse(&label)?,
                    label,
                    info,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        releases.sort_by(|a, b| {
            b.version
                .cmp(&a.version)
                .then_with(|| b.label.cmp(&a.label))
        });

        Ok(Self {
            releases,
            _scheme: PhantomData,
        })
    }

    /// Parse a JSON release history and sort it.
    pub fn from_json(raw: &str) -> Result<Self> {
        let history: ReleaseHistory = serde_json::from_str(raw)?;
        Self::new(history)
    }

    /// All releases, newest first.
    pub fn sorted(&self) -> impl Iterator<Item = (&str, &ReleaseInfo)> {
        self.releases.iter().map(|r| (r.label.as_str(), &r.info))
    }

    fn enabled(&self) -> impl Iterator<Item = &Release<S::Version>> {
        self.releases.iter().filter(|r| r.info.enabled)
    }

    fn latest(&self) -> Result<&Release<S::Version>> {
        self.enabled().next().ok_or(CodePushError::NoLatestRelease)
    }

    /// Newest enabled release.
    pub fn find_latest_release(&self) -> Result<(&str, &ReleaseInfo)> {
        let latest = self.latest()?;
        Ok((latest.label.as_str(), &latest.info))
    }

    /// Whether moving off `runtime_version` is mandatory.
    ///
    /// `None` means no update has been installed yet.
    pub fn check_is_mandatory(&self, runtime_version: Option<&str>) -> Result<bool> {
        if self.should_rollback(runtime_version)? {
            return Ok(true);
        }

        let latest_mandatory = match self.enabled().find(|r| r.info.mandatory) {
            Some(release) => release,
            None => return Ok(false),
        };

        match runtime_version {
            None => Ok(true),
            Some(raw) => Ok(latest_mandatory.version > S::parse(raw)?),
        }
    }

    /// Whether `runtime_version` is newer than every enabled release.
    pub fn should_rollback(&self, runtime_version: Option<&str>) -> Result<bool> {
        let raw = match runtime_version {
            Some(raw) => raw,
            None => return Ok(false),
        };

        let latest = self.latest()?;
        Ok(S::parse(raw)? > latest.version)
    }

    /// Whether the running bundle must be discarded in favor of the one
    /// shipped with the binary.
    pub fn should_rollback_to_binary(&self, runtime_version: Option<&str>) -> Result<bool> {
        if runtime_version.is_none() {
            return Ok(false);
        }

        let latest = self.latest()?;
        let is_binary = self
            .releases
            .last()
            .map(|binary| binary.label == latest.label)
            .unwrap_or(false);

        Ok(is_binary && self.should_rollback(runtime_version)?)
    }
}
