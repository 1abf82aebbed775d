// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation operations for slide decks.
//!
//! Operations are applied with optimistic concurrency (revision checks) against a
//! working copy of the deck; the live deck is only overwritten after every op in
//! the batch succeeded, so a failed edit never leaves a half-mutated deck behind.
//! The result carries a minimal delta the session layer can use to refresh
//! derived state (verification lookups, persistence, UI).

use std::collections::BTreeSet;
use std::fmt;

use crate::format::html::css::merge_css;
use crate::format::html::scan::{element_id_spans, element_ids};
use crate::format::html::script::rewrite_canvas_refs;
use crate::model::{slide_label, Slide, SlideDeck, SlideId};

/// A slide fragment proposed by an edit: wrapper markup plus the script that
/// drives its charts. Ids and collision handling are the engine's job, not the
/// proposer's.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewSlide {
    pub html: String,
    pub scripts: String,
}

impl NewSlide {
    pub fn new(html: impl Into<String>, scripts: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            scripts: scripts.into(),
        }
    }
}

/// Where a pure insertion lands relative to the caller's selected slide range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddPosition {
    Before,
    #[default]
    After,
    Beginning,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckOp {
    /// Removes `count` slides at `start` and inserts `slides` there, in order.
    /// `count = 0` is a pure positional insertion; unequal counts expand or
    /// condense the deck. Out-of-range ranges clamp (python-slice style) with
    /// a logged warning rather than failing.
    ReplaceRange {
        start: usize,
        count: usize,
        slides: Vec<NewSlide>,
    },
    /// Pure insertion resolved against the caller's selection. When the live
    /// deck is smaller than the index the selection implies, the engine fails
    /// closed to position 0 and logs the divergence; callers are expected to
    /// check their selection against the live deck beforehand.
    InsertSlides {
        position: AddPosition,
        anchor: Vec<usize>,
        slides: Vec<NewSlide>,
    },
    /// Removes `count` slides at `start`, clamped like `ReplaceRange`.
    RemoveRange { start: usize, count: usize },
    /// Reorders slides; `order[new_index] = old_index`, exact permutation required.
    Reorder { order: Vec<usize> },
    SetTitle { title: String },
    /// Folds a partial replacement stylesheet into the deck CSS.
    MergeCss { replacement: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub new_rev: u64,
    pub applied: usize,
    pub delta: DeckDelta,
}

/// Minimal delta describing which slides changed as the result of applying ops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeckDelta {
    pub added: Vec<SlideId>,
    pub removed: Vec<SlideId>,
    pub updated: Vec<SlideId>,
    /// `(proposed_id, committed_id)` for every canvas renamed to avoid a collision.
    pub canvas_renames: Vec<(String, String)>,
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: BTreeSet<SlideId>,
    removed: BTreeSet<SlideId>,
    updated: BTreeSet<SlideId>,
    canvas_renames: Vec<(String, String)>,
}

impl DeltaBuilder {
    fn record_added(&mut self, slide_id: SlideId) {
        self.removed.remove(&slide_id);
        self.updated.remove(&slide_id);
        self.added.insert(slide_id);
    }

    fn record_removed(&mut self, slide_id: SlideId) {
        // A slide added and removed within one batch never existed outside it.
        if self.added.remove(&slide_id) {
            return;
        }
        self.updated.remove(&slide_id);
        self.removed.insert(slide_id);
    }

    fn record_updated(&mut self, slide_id: SlideId) {
        if self.added.contains(&slide_id) || self.removed.contains(&slide_id) {
            return;
        }
        self.updated.insert(slide_id);
    }

    fn record_canvas_rename(&mut self, from: String, to: String) {
        self.canvas_renames.push((from, to));
    }

    fn finish(self) -> DeckDelta {
        DeckDelta {
            added: self.added.into_iter().collect(),
            removed: self.removed.into_iter().collect(),
            updated: self.updated.into_iter().collect(),
            canvas_renames: self.canvas_renames,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    Conflict { base_rev: u64, current_rev: u64 },
    InvalidPermutation { expected_len: usize, order: Vec<usize> },
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict { base_rev, current_rev } => {
                write!(f, "stale base_rev (base_rev={base_rev}, current_rev={current_rev})")
            }
            Self::InvalidPermutation { expected_len, order } => {
                write!(
                    f,
                    "reorder is not a permutation of 0..{expected_len} (order={order:?})"
                )
            }
        }
    }
}

impl std::error::Error for ApplyError {}

pub fn apply_ops(
    deck: &mut SlideDeck,
    base_rev: u64,
    ops: &[DeckOp],
) -> Result<ApplyResult, ApplyError> {
    let current_rev = deck.rev();
    if base_rev != current_rev {
        return Err(ApplyError::Conflict { base_rev, current_rev });
    }

    if ops.is_empty() {
        return Ok(ApplyResult {
            new_rev: current_rev,
            applied: 0,
            delta: DeckDelta::default(),
        });
    }

    let mut next = deck.clone();
    let mut delta = DeltaBuilder::default();
    let mut labeler = SlideLabeler::for_deck(&next);

    for op in ops {
        match op {
            DeckOp::ReplaceRange { start, count, slides } => {
                apply_replace(&mut next, *start, *count, slides, &mut labeler, &mut delta);
            }
            DeckOp::InsertSlides { position, anchor, slides } => {
                let index = resolve_insert_index(&next, *position, anchor);
                apply_replace(&mut next, index, 0, slides, &mut labeler, &mut delta);
            }
            DeckOp::RemoveRange { start, count } => {
                apply_replace(&mut next, *start, *count, &[], &mut labeler, &mut delta);
            }
            DeckOp::Reorder { order } => {
                apply_reorder(&mut next, order, &mut delta)?;
            }
            DeckOp::SetTitle { title } => {
                next.set_title(title.clone());
            }
            DeckOp::MergeCss { replacement } => {
                next.set_css(merge_css(next.css(), replacement));
            }
        }
    }

    next.bump_rev();
    let new_rev = next.rev();
    *deck = next;

    Ok(ApplyResult {
        new_rev,
        applied: ops.len(),
        delta: delta.finish(),
    })
}

// Extracted range/insert/reorder implementation used by `apply_ops`.
include!("ops_impl.rs");

#[cfg(test)]
mod tests;
