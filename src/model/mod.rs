// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Sessions contain a live slide deck plus the verification index, chat
//! transcript, bounded version history, and the current slide selection.

pub mod chat;
pub mod deck;
pub(crate) mod fixtures;
pub mod ids;
pub mod session;
pub mod slide;

pub use chat::{now_ms, ChatMessage, ChatRole};
pub use deck::{SlideDeck, CHART_CDN_URL};
pub use ids::{slide_label, Id, IdError, SessionId, SlideId};
pub use session::{DeckSession, RestoreError, RestoreOutcome, VersionPreview};
pub use slide::Slide;
