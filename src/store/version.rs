// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Bounded deck version history.
//!
//! Version numbers are strictly increasing and never reused, even after
//! eviction or restore. At the limit, creating a version deletes exactly the
//! single oldest one first. Stored versions are immutable; they are only ever
//! deleted (by eviction or by restore truncation).

use std::collections::BTreeMap;
use std::fmt;

use crate::model::{now_ms, ChatMessage};
use crate::store::snapshot::DeckSnapshot;
use crate::verify::VerificationMap;

/// Maximum number of retained versions per session.
pub const VERSION_LIMIT: usize = 40;

#[derive(Debug, Clone, PartialEq)]
pub struct Version {
    number: u64,
    description: String,
    snapshot: DeckSnapshot,
    verification: VerificationMap,
    chat: Vec<ChatMessage>,
    created_at_ms: u64,
    created_by: Option<String>,
}

impl Version {
    /// Rebuilds a stored version, e.g. when rehydrating from disk.
    #[allow(clippy::too_many_arguments)]
    pub fn from_stored(
        number: u64,
        description: impl Into<String>,
        snapshot: DeckSnapshot,
        verification: VerificationMap,
        chat: Vec<ChatMessage>,
        created_at_ms: u64,
        created_by: Option<String>,
    ) -> Self {
        Self {
            number,
            description: description.into(),
            snapshot,
            verification,
            chat,
            created_at_ms,
            created_by,
        }
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn snapshot(&self) -> &DeckSnapshot {
        &self.snapshot
    }

    pub fn verification(&self) -> &VerificationMap {
        &self.verification
    }

    pub fn chat(&self) -> &[ChatMessage] {
        &self.chat
    }

    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }
}

/// Listing row: metadata only, no snapshot payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMeta {
    pub number: u64,
    pub description: String,
    pub created_at_ms: u64,
    pub slide_count: usize,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionNotFound {
    pub number: u64,
}

impl fmt::Display for VersionNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "version {} not found", self.number)
    }
}

impl std::error::Error for VersionNotFound {}

/// Outcome of a create: the assigned number plus the number of the version
/// evicted to stay within the limit, if any. The caller owns on-disk GC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateOutcome {
    pub number: u64,
    pub evicted: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionStore {
    versions: BTreeMap<u64, Version>,
    next_number: u64,
}

impl VersionStore {
    pub fn new() -> Self {
        Self {
            versions: BTreeMap::new(),
            next_number: 1,
        }
    }

    /// Rehydrates from persisted versions. The next number continues past both
    /// the persisted counter and the highest stored version, so numbers stay
    /// unused even when the counter file lagged behind.
    pub fn from_parts(versions: Vec<Version>, next_number: u64) -> Self {
        let highest = versions.iter().map(Version::number).max().unwrap_or(0);
        Self {
            versions: versions
                .into_iter()
                .map(|version| (version.number(), version))
                .collect(),
            next_number: next_number.max(highest + 1).max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn next_number(&self) -> u64 {
        self.next_number
    }

    pub fn versions(&self) -> impl Iterator<Item = &Version> {
        self.versions.values()
    }

    pub fn create_version(
        &mut self,
        description: impl Into<String>,
        snapshot: DeckSnapshot,
        verification: VerificationMap,
        chat: Vec<ChatMessage>,
        created_by: Option<String>,
    ) -> CreateOutcome {
        let number = self.next_number;
        self.next_number += 1;

        self.versions.insert(
            number,
            Version {
                number,
                description: description.into(),
                snapshot,
                verification,
                chat,
                created_at_ms: now_ms(),
                created_by,
            },
        );

        let evicted = if self.versions.len() > VERSION_LIMIT {
            let oldest = *self
                .versions
                .keys()
                .next()
                .expect("store over the limit is non-empty");
            self.versions.remove(&oldest);
            Some(oldest)
        } else {
            None
        };

        CreateOutcome { number, evicted }
    }

    /// Metadata for every stored version, newest first.
    pub fn list_versions(&self) -> Vec<VersionMeta> {
        self.versions
            .values()
            .rev()
            .map(|version| VersionMeta {
                number: version.number(),
                description: version.description().to_owned(),
                created_at_ms: version.created_at_ms(),
                slide_count: version.snapshot().slides.len(),
                created_by: version.created_by().map(str::to_owned),
            })
            .collect()
    }

    /// Read-only access; never mutates stored state.
    pub fn get(&self, number: u64) -> Result<&Version, VersionNotFound> {
        self.versions.get(&number).ok_or(VersionNotFound { number })
    }

    /// Deletes every version with a number strictly greater than `number` and
    /// returns the deleted numbers in ascending order.
    pub fn remove_after(&mut self, number: u64) -> Vec<u64> {
        let removed = self
            .versions
            .range(number + 1..)
            .map(|(&key, _)| key)
            .collect::<Vec<_>>();
        for key in &removed {
            self.versions.remove(key);
        }
        removed
    }
}
