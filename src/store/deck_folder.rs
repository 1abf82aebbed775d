// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Folder-backed session persistence.
//!
//! One directory per session:
//!
//! - `proteus-session.meta.json` — session id, selection, version counter
//! - `deck.snapshot.json` — the deck snapshot (skipped when the rev is unchanged)
//! - `deck.html` — derived full-document export, rewritten with the snapshot
//! - `verification.json` — verification records keyed by content hash
//! - `chat.json` — the session transcript
//! - `versions/v<n>.json` — immutable stored versions, garbage-collected on save
//!
//! All writes go through an atomic temp-file-plus-rename path that refuses
//! symlinks and paths escaping the session directory. A failed write surfaces
//! as a `StoreError`; the in-memory session is then ahead of the store and
//! reconciliation is the caller's job.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::format::html::knit_deck;
use crate::model::{fixtures, ChatMessage, ChatRole, DeckSession, SessionId};
use crate::store::snapshot::{deck_from_snapshot, snapshot_deck, DeckSnapshot};
use crate::store::version::{Version, VersionStore};
use crate::store::{SessionStore, StoreError};
use crate::verify::{ContentHash, VerificationMap, VerificationRecord};

const SESSION_META_FILENAME: &str = "proteus-session.meta.json";
const SNAPSHOT_FILENAME: &str = "deck.snapshot.json";
const DECK_HTML_FILENAME: &str = "deck.html";
const VERIFICATION_FILENAME: &str = "verification.json";
const CHAT_FILENAME: &str = "chat.json";
const VERSIONS_DIRNAME: &str = "versions";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents and rename operations to stable
    /// storage where possible. Exact guarantees are platform/filesystem-dependent.
    Durable,
}

#[derive(Debug, Clone)]
pub struct DeckFolder {
    root: PathBuf,
    durability: WriteDurability,
}

impl DeckFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn meta_path(&self) -> PathBuf {
        self.root.join(SESSION_META_FILENAME)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.root.join(SNAPSHOT_FILENAME)
    }

    pub fn deck_html_path(&self) -> PathBuf {
        self.root.join(DECK_HTML_FILENAME)
    }

    pub fn verification_path(&self) -> PathBuf {
        self.root.join(VERIFICATION_FILENAME)
    }

    pub fn chat_path(&self) -> PathBuf {
        self.root.join(CHAT_FILENAME)
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.root.join(VERSIONS_DIRNAME)
    }

    pub fn version_path(&self, number: u64) -> PathBuf {
        self.versions_dir().join(format!("v{number}.json"))
    }

    /// Loads the session, or seeds a fresh one with the hello deck when the
    /// folder holds no session yet. The seeded session is saved immediately.
    pub fn load_or_init_session(&self, session_id: SessionId) -> Result<DeckSession, StoreError> {
        if let Some(session) = self.load_session()? {
            return Ok(session);
        }

        let mut session = DeckSession::new(session_id);
        session.set_deck(fixtures::hello_deck());
        self.save_session(&session)?;
        Ok(session)
    }
}

impl SessionStore for DeckFolder {
    fn load_session(&self) -> Result<Option<DeckSession>, StoreError> {
        let meta_path = self.meta_path();
        let Some(meta) = read_json_opt::<SessionMetaJson>(&meta_path)? else {
            return Ok(None);
        };

        let session_id =
            SessionId::new(meta.session_id.as_str()).map_err(|source| StoreError::InvalidId {
                field: "sessionId",
                value: meta.session_id.clone(),
                source: Box::new(source),
            })?;
        let mut session = DeckSession::new(session_id);

        let snapshot_path = self.snapshot_path();
        if let Some(snapshot) = read_json_opt::<DeckSnapshot>(&snapshot_path)? {
            let deck = deck_from_snapshot(&snapshot).map_err(|source| StoreError::Snapshot {
                path: snapshot_path,
                source,
            })?;
            session.set_deck(deck);
        }

        if let Some(records) = read_json_opt::<VerificationJson>(&self.verification_path())? {
            *session.verification_mut() = verification_from_json(records)?;
        }

        if let Some(chat) = read_json_opt::<Vec<ChatMessageJson>>(&self.chat_path())? {
            *session.chat_mut() = chat.into_iter().map(ChatMessage::from).collect();
        }

        let versions = load_versions(&self.versions_dir())?;
        *session.versions_mut() = VersionStore::from_parts(versions, meta.next_version_number);

        session.set_selected_slides(meta.selected_slides.into_iter().collect());

        Ok(Some(session))
    }

    fn save_session(&self, session: &DeckSession) -> Result<(), StoreError> {
        let meta = SessionMetaJson {
            session_id: session.session_id().to_string(),
            selected_slides: session.selected_slides().iter().copied().collect(),
            next_version_number: session.versions().next_number(),
        };
        write_json(self, &self.meta_path(), &meta)?;

        let snapshot = snapshot_deck(session.deck());
        let snapshot_path = self.snapshot_path();
        let stored_rev = read_json_opt::<DeckSnapshot>(&snapshot_path)
            .ok()
            .flatten()
            .map(|stored| stored.rev);
        if stored_rev != Some(snapshot.rev) {
            write_json(self, &snapshot_path, &snapshot)?;
            // Derived export, kept in lockstep with the snapshot.
            write_atomic_in_session(
                &self.root,
                &self.deck_html_path(),
                knit_deck(session.deck()).as_bytes(),
                self.durability,
            )?;
        }

        write_json(
            self,
            &self.verification_path(),
            &verification_to_json(session.verification()),
        )?;
        write_json(
            self,
            &self.chat_path(),
            &session
                .chat()
                .iter()
                .map(ChatMessageJson::from)
                .collect::<Vec<_>>(),
        )?;

        for version in session.versions().versions() {
            let path = self.version_path(version.number());
            // Versions are immutable once written.
            if !path.exists() {
                write_json(self, &path, &VersionJson::from(version))?;
            }
        }
        gc_version_files(self, session)?;

        Ok(())
    }

    fn delete_session(&self) -> Result<(), StoreError> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                path: self.root.clone(),
                source,
            }),
        }
    }
}

// Extracted wire DTOs and safe filesystem helpers for `DeckFolder`.
include!("deck_folder/helpers.rs");
