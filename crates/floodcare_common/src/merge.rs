//! Merge policies for applying a remote pull to the local report list
//!
//! `Replace` is the historical behaviour: a non-empty pull is the new truth.
//! It loses a locally created report whose push has not landed in the sheet
//! yet, and a local resolve that was never written back.
//!
//! `Union` keeps those local changes until the remote confirms them: reports
//! created here stay listed until their id shows up remotely, and reports
//! resolved here stay resolved until the remote says so too.

use crate::types::Report;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    #[default]
    Replace,
    Union,
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergePolicy::Replace => f.write_str("replace"),
            MergePolicy::Union => f.write_str("union"),
        }
    }
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(MergePolicy::Replace),
            "union" => Ok(MergePolicy::Union),
            other => Err(format!("unknown merge policy: {}", other)),
        }
    }
}

/// Local changes the remote has not confirmed yet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingChanges {
    /// Ids of reports created in this process
    pub created: HashSet<String>,
    /// Ids of reports resolved in this process
    pub resolved: HashSet<String>,
}

impl PendingChanges {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.resolved.is_empty()
    }

    pub fn clear(&mut self) {
        self.created.clear();
        self.resolved.clear();
    }
}

/// Result of a sync cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// A cycle was already running
    Skipped,
    /// Remote returned nothing (or failed); store untouched
    NoUpdate,
    Replaced { count: usize },
    Merged { count: usize, kept_local: usize },
}

/// Union of a non-empty remote list with unconfirmed local changes
///
/// Returns the merged list (unconfirmed local reports first, newest-first,
/// then the remote list in its order) and the number of local reports kept.
/// `pending` is updated: confirmed ids are dropped.
pub fn merge_union(
    local: &[Report],
    remote: Vec<Report>,
    pending: &mut PendingChanges,
) -> (Vec<Report>, usize) {
    let remote_ids: HashSet<&str> = remote.iter().map(|r| r.id.as_str()).collect();
    pending.created.retain(|id| !remote_ids.contains(id.as_str()));

    let mut kept: Vec<Report> = local
        .iter()
        .filter(|r| pending.created.contains(&r.id))
        .cloned()
        .collect();
    kept.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    let kept_local = kept.len();

    pending
        .resolved
        .retain(|id| remote_ids.contains(id.as_str()) || pending.created.contains(id));

    let mut merged = kept;
    merged.reserve(remote.len());
    for mut report in remote {
        if pending.resolved.contains(&report.id) {
            if report.is_resolved {
                pending.resolved.remove(&report.id);
            } else {
                report.is_resolved = true;
            }
        }
        merged.push(report);
    }

    (merged, kept_local)
}
