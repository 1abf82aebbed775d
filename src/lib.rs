// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Proteus — slide-deck document core for LLM-authored HTML presentations.
//!
//! The deck lives in memory as a [`model::SlideDeck`]; [`format::html`] parses
//! full HTML documents into decks and knits them back out, [`ops`] applies
//! range-based edit batches under optimistic concurrency, [`verify`] tracks
//! content-hash verification records, and [`store`] persists sessions to a
//! folder with a bounded version history.

pub mod format;
pub mod model;
pub mod ops;
pub mod store;
pub mod verify;
