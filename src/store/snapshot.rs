// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Serialized deck snapshots: the sole interchange format between the live
//! model, the version store, and persistence.
//!
//! Snapshots are validated on the way in (`deck_from_snapshot`), never trusted:
//! an invalid slide id or a duplicate canvas id in stored JSON is an error, not
//! something rehydrated into a broken deck.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::format::html::scan::element_ids;
use crate::model::{IdError, Slide, SlideDeck, SlideId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideSnapshot {
    pub html: String,
    pub slide_id: String,
    pub scripts: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSnapshot {
    pub title: String,
    pub css: String,
    pub external_scripts: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_meta: Vec<String>,
    pub slides: Vec<SlideSnapshot>,
    #[serde(default)]
    pub rev: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    InvalidSlideId { slide_id: String, reason: IdError },
    DuplicateCanvasId { canvas_id: String },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSlideId { slide_id, reason } => {
                write!(f, "invalid slide id '{slide_id}': {reason}")
            }
            Self::DuplicateCanvasId { canvas_id } => {
                write!(f, "duplicate canvas id '{canvas_id}' across slides")
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

pub fn snapshot_deck(deck: &SlideDeck) -> DeckSnapshot {
    DeckSnapshot {
        title: deck.title().to_owned(),
        css: deck.css().to_owned(),
        external_scripts: deck.external_scripts().to_vec(),
        extra_meta: deck.extra_meta().to_vec(),
        slides: deck
            .slides()
            .iter()
            .map(|slide| SlideSnapshot {
                html: slide.html().to_owned(),
                slide_id: slide.slide_id().as_str().to_owned(),
                scripts: slide.scripts().to_owned(),
            })
            .collect(),
        rev: deck.rev(),
    }
}

pub fn deck_from_snapshot(snapshot: &DeckSnapshot) -> Result<SlideDeck, SnapshotError> {
    let mut deck = SlideDeck::new(snapshot.title.clone());
    deck.set_css(snapshot.css.clone());
    for url in &snapshot.external_scripts {
        deck.add_external_script(url.clone());
    }
    deck.extra_meta_mut().extend(snapshot.extra_meta.clone());
    deck.set_rev(snapshot.rev);

    let mut seen_canvas_ids = BTreeSet::new();
    for slide in &snapshot.slides {
        let slide_id = SlideId::new(slide.slide_id.as_str()).map_err(|reason| {
            SnapshotError::InvalidSlideId {
                slide_id: slide.slide_id.clone(),
                reason,
            }
        })?;
        for canvas_id in element_ids(&slide.html) {
            if !seen_canvas_ids.insert(canvas_id.clone()) {
                return Err(SnapshotError::DuplicateCanvasId { canvas_id });
            }
        }
        deck.slides_mut()
            .push(Slide::new(slide_id, slide.html.clone(), slide.scripts.clone()));
    }

    Ok(deck)
}
