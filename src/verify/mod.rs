// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Content-hash verification index.
//!
//! Judge results are keyed by a fingerprint of a slide's normalized content, not by
//! slide object identity, so a full deck regeneration keeps the verification of every
//! slide whose visible content did not change.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::model::Slide;

/// Normalizes slide markup for fingerprinting: strips HTML comments, collapses
/// whitespace runs to a single space, drops whitespace touching a tag boundary
/// (after `>` or before `<`, where rendering ignores it), lowercases, and trims.
pub fn normalize_content(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find("<!--") {
        out.push_str(&rest[..start]);
        match rest[start + 4..].find("-->") {
            Some(end) => rest = &rest[start + 4 + end + 3..],
            // Unterminated comment: everything after it is invisible.
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);

    let mut normalized = String::with_capacity(out.len());
    let mut pending_space = false;
    for ch in out.chars() {
        if ch.is_whitespace() {
            pending_space = !normalized.is_empty();
            continue;
        }
        if pending_space {
            if !normalized.ends_with('>') && ch != '<' {
                normalized.push(' ');
            }
            pending_space = false;
        }
        for lowered in ch.to_lowercase() {
            normalized.push(lowered);
        }
    }

    normalized
}

/// A 16-hex-char content fingerprint: the first 8 bytes of SHA-256 over the
/// normalized markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash([u8; 8]);

impl ContentHash {
    pub const fn new(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// Fingerprints slide markup. Equal normalized content yields an equal hash.
    pub fn of_content(html: &str) -> Self {
        let digest = Sha256::digest(normalize_content(html).as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        Self(bytes)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for ContentHash {
    type Err = ContentHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 16 {
            return Err(ContentHashError::InvalidLength { actual: s.len() });
        }
        let decoded = hex::decode(s).map_err(|source| ContentHashError::InvalidHex { source })?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

#[derive(Debug)]
pub enum ContentHashError {
    InvalidLength { actual: usize },
    InvalidHex { source: hex::FromHexError },
}

impl fmt::Display for ContentHashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength { actual } => {
                write!(f, "content hash must be 16 hex chars (got {actual})")
            }
            Self::InvalidHex { source } => write!(f, "content hash is not valid hex: {source}"),
        }
    }
}

impl std::error::Error for ContentHashError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidLength { .. } => None,
            Self::InvalidHex { source } => Some(source),
        }
    }
}

/// Opaque judge output. The index only needs the key; the judge's internal
/// schema stays its own business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationRecord(serde_json::Value);

impl VerificationRecord {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// The verification state of a live slide after a hash lookup.
///
/// A miss is an explicit `Unverified`, never a silently reused stale record.
#[derive(Debug, Clone, PartialEq)]
pub enum SlideVerification {
    Verified(VerificationRecord),
    Unverified,
}

impl SlideVerification {
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified(_))
    }
}

/// Verification records keyed by content hash, stored apart from the deck snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerificationMap {
    records: BTreeMap<ContentHash, VerificationRecord>,
}

impl VerificationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &BTreeMap<ContentHash, VerificationRecord> {
        &self.records
    }

    pub fn record(&mut self, hash: ContentHash, record: VerificationRecord) {
        self.records.insert(hash, record);
    }

    pub fn lookup(&self, hash: &ContentHash) -> Option<&VerificationRecord> {
        self.records.get(hash)
    }

    /// Recomputes the slide's live hash and looks it up.
    pub fn status_of(&self, slide: &Slide) -> SlideVerification {
        match self.lookup(&ContentHash::of_content(slide.html())) {
            Some(record) => SlideVerification::Verified(record.clone()),
            None => SlideVerification::Unverified,
        }
    }

    /// Folds `other` into this map; on key collision the newer record wins.
    pub fn merge(&mut self, other: &VerificationMap) {
        for (hash, record) in &other.records {
            self.records.insert(*hash, record.clone());
        }
    }
}
