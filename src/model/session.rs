// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Per-session editing state: the live deck plus verification, chat transcript,
//! version history, and the current slide selection.
//!
//! Mutating entry points assume the caller holds the external per-session lock;
//! there is no internal locking and everything here is a synchronous in-memory
//! transform.

use std::collections::BTreeSet;
use std::fmt;

use crate::store::snapshot::{deck_from_snapshot, snapshot_deck, DeckSnapshot, SnapshotError};
use crate::store::version::{CreateOutcome, VersionNotFound, VersionStore};
use crate::verify::{ContentHash, SlideVerification, VerificationMap};

use super::chat::{ChatMessage, ChatRole};
use super::deck::SlideDeck;
use super::ids::SessionId;

#[derive(Debug, Clone, PartialEq)]
pub struct DeckSession {
    session_id: SessionId,
    deck: SlideDeck,
    verification: VerificationMap,
    chat: Vec<ChatMessage>,
    versions: VersionStore,
    selected_slides: BTreeSet<usize>,
}

/// Read-only view of a stored version: the snapshot plus verification re-derived
/// by content hash and the captured transcript. Building one never mutates the
/// stored version.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionPreview {
    pub number: u64,
    pub description: String,
    pub created_at_ms: u64,
    pub snapshot: DeckSnapshot,
    pub slide_verification: Vec<SlideVerification>,
    pub chat: Vec<ChatMessage>,
}

/// What a restore discarded: forward history is gone for good.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOutcome {
    pub deleted_versions: Vec<u64>,
    pub deleted_messages: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreError {
    NotFound(VersionNotFound),
    Snapshot(SnapshotError),
}

impl fmt::Display for RestoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(source) => source.fmt(f),
            Self::Snapshot(source) => write!(f, "stored snapshot is invalid: {source}"),
        }
    }
}

impl std::error::Error for RestoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(source) => Some(source),
            Self::Snapshot(source) => Some(source),
        }
    }
}

impl From<VersionNotFound> for RestoreError {
    fn from(source: VersionNotFound) -> Self {
        Self::NotFound(source)
    }
}

impl DeckSession {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            deck: SlideDeck::default(),
            verification: VerificationMap::new(),
            chat: Vec::new(),
            versions: VersionStore::new(),
            selected_slides: BTreeSet::new(),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn deck(&self) -> &SlideDeck {
        &self.deck
    }

    pub fn deck_mut(&mut self) -> &mut SlideDeck {
        &mut self.deck
    }

    pub fn set_deck(&mut self, deck: SlideDeck) {
        self.deck = deck;
    }

    pub fn verification(&self) -> &VerificationMap {
        &self.verification
    }

    pub fn verification_mut(&mut self) -> &mut VerificationMap {
        &mut self.verification
    }

    pub fn chat(&self) -> &[ChatMessage] {
        &self.chat
    }

    pub fn chat_mut(&mut self) -> &mut Vec<ChatMessage> {
        &mut self.chat
    }

    pub fn push_message(&mut self, role: ChatRole, content: impl Into<String>) {
        self.chat.push(ChatMessage::new(role, content));
    }

    pub fn versions(&self) -> &VersionStore {
        &self.versions
    }

    pub fn versions_mut(&mut self) -> &mut VersionStore {
        &mut self.versions
    }

    pub fn selected_slides(&self) -> &BTreeSet<usize> {
        &self.selected_slides
    }

    pub fn set_selected_slides(&mut self, selected_slides: BTreeSet<usize>) {
        self.selected_slides = selected_slides;
    }

    /// A selection pointing past the live deck signals state divergence between
    /// the caller and this session. Callers check this before positional edits.
    pub fn selection_in_bounds(&self) -> bool {
        self.selected_slides
            .iter()
            .all(|&index| index < self.deck.slide_count())
    }

    /// Verification status of every live slide, by content hash. A slide whose
    /// normalized content has no stored record is explicitly unverified; stale
    /// records are never reattached to changed content.
    pub fn slide_verification(&self) -> Vec<SlideVerification> {
        self.deck
            .slides()
            .iter()
            .map(|slide| self.verification.status_of(slide))
            .collect()
    }

    /// Creates a version of the current state. The current transcript is
    /// captured automatically when `chat` is omitted.
    pub fn create_version(
        &mut self,
        description: impl Into<String>,
        chat: Option<Vec<ChatMessage>>,
        created_by: Option<String>,
    ) -> CreateOutcome {
        let snapshot = snapshot_deck(&self.deck);
        let verification = self.verification.clone();
        let chat = chat.unwrap_or_else(|| self.chat.clone());
        self.versions
            .create_version(description, snapshot, verification, chat, created_by)
    }

    /// Read-only look at version `number`; stored state is never mutated.
    pub fn preview_version(&self, number: u64) -> Result<VersionPreview, VersionNotFound> {
        let version = self.versions.get(number)?;

        let slide_verification = version
            .snapshot()
            .slides
            .iter()
            .map(|slide| {
                let hash = ContentHash::of_content(&slide.html);
                match version.verification().lookup(&hash) {
                    Some(record) => SlideVerification::Verified(record.clone()),
                    None => SlideVerification::Unverified,
                }
            })
            .collect();

        Ok(VersionPreview {
            number: version.number(),
            description: version.description().to_owned(),
            created_at_ms: version.created_at_ms(),
            snapshot: version.snapshot().clone(),
            slide_verification,
            chat: version.chat().to_vec(),
        })
    }

    /// Rewinds the session to version `number`: the live deck is rebuilt from
    /// the stored snapshot, every later version is deleted, and every chat
    /// message timestamped after the version's creation is dropped. Destructive
    /// and one-directional.
    pub fn restore_version(&mut self, number: u64) -> Result<RestoreOutcome, RestoreError> {
        let version = self.versions.get(number)?;
        let mut restored = deck_from_snapshot(version.snapshot()).map_err(RestoreError::Snapshot)?;
        let cutoff_ms = version.created_at_ms();

        // Verification survives by content identity; the stored map only adds.
        self.verification.merge(version.verification());

        // The live rev keeps counting so stale callers still get conflicts.
        restored.set_rev(self.deck.rev());
        restored.bump_rev();
        self.deck = restored;

        let deleted_versions = self.versions.remove_after(number);
        let before = self.chat.len();
        self.chat
            .retain(|message| message.created_at_ms() <= cutoff_ms);
        let deleted_messages = before - self.chat.len();

        self.selected_slides.clear();

        Ok(RestoreOutcome {
            deleted_versions,
            deleted_messages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{DeckSession, RestoreError};
    use crate::model::{slide_label, ChatMessage, ChatRole, SessionId, Slide};
    use crate::store::version::VersionNotFound;
    use crate::verify::{ContentHash, SlideVerification, VerificationMap, VerificationRecord};

    fn session_with_slides(count: usize) -> DeckSession {
        let mut session = DeckSession::new(SessionId::new("s-test").expect("session id"));
        for index in 0..count {
            session.deck_mut().slides_mut().push(Slide::new(
                slide_label(index),
                format!("<div class=\"slide\"><canvas id=\"c{index}\"></canvas></div>"),
                String::new(),
            ));
        }
        session
    }

    fn record(note: &str) -> VerificationRecord {
        VerificationRecord::new(serde_json::json!({ "verdict": note }))
    }

    #[test]
    fn restore_drops_later_versions_and_later_messages() {
        let mut session = session_with_slides(2);
        session
            .chat_mut()
            .push(ChatMessage::with_timestamp(ChatRole::User, "before", 100));

        let target = session.create_version("checkpoint", None, None).number;
        let created_at = session
            .versions()
            .get(target)
            .expect("stored version")
            .created_at_ms();

        session.chat_mut().push(ChatMessage::with_timestamp(
            ChatRole::Assistant,
            "after",
            created_at + 1,
        ));
        session.deck_mut().slides_mut().clear();
        for _ in 0..3 {
            session.create_version("later", None, None);
        }
        session.set_selected_slides([0, 1].into_iter().collect());

        let outcome = session.restore_version(target).expect("restore");
        assert_eq!(outcome.deleted_versions, [target + 1, target + 2, target + 3]);
        assert_eq!(outcome.deleted_messages, 1);
        assert_eq!(session.deck().slide_count(), 2);
        assert_eq!(session.chat().len(), 1);
        assert_eq!(session.chat()[0].content(), "before");
        assert!(session.selected_slides().is_empty());
        assert_eq!(session.versions().len(), 1);
    }

    #[test]
    fn restore_of_missing_version_is_an_explicit_not_found() {
        let mut session = session_with_slides(1);
        assert_eq!(
            session.restore_version(9),
            Err(RestoreError::NotFound(VersionNotFound { number: 9 }))
        );
    }

    #[test]
    fn restore_keeps_the_rev_monotonic() {
        let mut session = session_with_slides(1);
        let target = session.create_version("checkpoint", None, None).number;
        session.deck_mut().set_rev(7);

        session.restore_version(target).expect("restore");
        assert_eq!(session.deck().rev(), 8);
    }

    #[test]
    fn preview_is_read_only_and_rederives_verification() {
        let mut session = session_with_slides(1);
        let slide_html = session.deck().slides()[0].html().to_owned();
        session
            .verification_mut()
            .record(ContentHash::of_content(&slide_html), record("pass"));
        let number = session.create_version("checkpoint", None, None).number;
        let before = session.clone();

        let preview = session.preview_version(number).expect("preview");
        assert_eq!(preview.snapshot.slides.len(), 1);
        assert_eq!(
            preview.slide_verification,
            [SlideVerification::Verified(record("pass"))]
        );
        assert_eq!(session, before);
    }

    #[test]
    fn verification_survives_full_regeneration_by_content() {
        let mut session = session_with_slides(1);
        let html = session.deck().slides()[0].html().to_owned();
        session
            .verification_mut()
            .record(ContentHash::of_content(&html), record("pass"));

        // Regenerate the deck: new Slide objects, same visible content.
        let rebuilt = Slide::new(slide_label(9), html.clone(), String::new());
        *session.deck_mut().slides_mut() = vec![rebuilt];

        let statuses = session.slide_verification();
        assert_eq!(statuses, [SlideVerification::Verified(record("pass"))]);

        // A visible content change goes back to explicitly unverified.
        session.deck_mut().slides_mut()[0].set_html(html.replace("c0", "c0x"));
        assert_eq!(session.slide_verification(), [SlideVerification::Unverified]);
    }

    #[test]
    fn selection_bounds_detect_state_divergence() {
        let mut session = session_with_slides(2);
        session.set_selected_slides([1].into_iter().collect());
        assert!(session.selection_in_bounds());

        session.set_selected_slides([5].into_iter().collect());
        assert!(!session.selection_in_bounds());
    }

    #[test]
    fn create_version_captures_the_current_transcript_by_default() {
        let mut session = session_with_slides(1);
        session.push_message(ChatRole::User, "make it blue");

        let number = session.create_version("auto", None, None).number;
        let version = session.versions().get(number).expect("stored version");
        assert_eq!(version.chat().len(), 1);
        assert_eq!(version.chat()[0].content(), "make it blue");

        let number = session
            .create_version("explicit", Some(Vec::new()), None)
            .number;
        let version = session.versions().get(number).expect("stored version");
        assert!(version.chat().is_empty());
    }

    #[test]
    fn unused_verification_map_is_isolated_per_version() {
        let mut session = session_with_slides(1);
        let number = session.create_version("v", None, None).number;

        session
            .verification_mut()
            .record(ContentHash::of_content("<p>later</p>"), record("late"));
        let stored = session.versions().get(number).expect("stored version");
        assert_eq!(stored.verification(), &VerificationMap::new());
    }
}
