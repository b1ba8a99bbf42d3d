//! Reference snapshot lookup
//!
//! A snapshot is a JSON file listing domains known to be blocked by the
//! regulator. It is reference data only: lookups never influence probing.
//!
//! Accepted shapes for `domains`:
//! - `["example.com", ...]`
//! - `{"example.com": <anything>, ...}` (keys are the domains)

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SnapshotDomains {
    List(Vec<String>),
    Map(BTreeMap<String, serde_json::Value>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotFile {
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    domains: Option<SnapshotDomains>,
}

/// Snapshot membership of a domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotStatus {
    Yes,
    No,
    Unknown,
}

impl SnapshotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotStatus::Yes => "yes",
            SnapshotStatus::No => "no",
            SnapshotStatus::Unknown => "unknown",
        }
    }
}

/// `snapshotInfo` block of the export document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotInfo {
    pub has_snapshot: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// Loaded snapshot
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    domains: Vec<String>,
    updated_at: Option<String>,
    sha256: Option<String>,
}

impl Snapshot {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let file: SnapshotFile = serde_json::from_slice(bytes)?;
        let domains = match file.domains {
            Some(SnapshotDomains::List(list)) => list,
            Some(SnapshotDomains::Map(map)) => map.into_keys().collect(),
            None => Vec::new(),
        };

        Ok(Self {
            domains: domains
                .iter()
                .map(|d| d.trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
            updated_at: file.updated_at,
            sha256: Some(format!("{:x}", Sha256::digest(bytes))),
        })
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let bytes = std::fs::read(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Case-insensitive exact or parent-domain match; `Unknown` on an empty snapshot
    pub fn status_of(&self, domain: &str) -> SnapshotStatus {
        if self.domains.is_empty() {
            return SnapshotStatus::Unknown;
        }
        let normalized = domain.trim().to_lowercase();
        let listed = self.domains.iter().any(|d| {
            normalized == *d
                || normalized
                    .strip_suffix(d.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        });
        if listed {
            SnapshotStatus::Yes
        } else {
            SnapshotStatus::No
        }
    }

    pub fn info(&self) -> SnapshotInfo {
        SnapshotInfo {
            has_snapshot: true,
            updated_at: self.updated_at.clone(),
            sha256: self.sha256.clone(),
        }
    }
}

/// Lookup over an optional snapshot
pub fn snapshot_status(snapshot: Option<&Snapshot>, domain: &str) -> SnapshotStatus {
    snapshot.map_or(SnapshotStatus::Unknown, |s| s.status_of(domain))
}

pub fn snapshot_info(snapshot: Option<&Snapshot>) -> SnapshotInfo {
    snapshot.map(Snapshot::info).unwrap_or_default()
}
