// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Knitter: reconstructs full-document HTML from a deck, or a standalone
//! single-slide document.

use std::fmt;

use crate::model::SlideDeck;

/// Opening line of the per-slide isolating closure emitted by `knit_deck`.
/// The parser strips this exact wrapper on re-parse so round-trips do not nest.
pub(crate) const CLOSURE_OPEN: &str = "(function () {";
pub(crate) const CLOSURE_CLOSE: &str = "})();";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnitError {
    SlideIndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for KnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SlideIndexOutOfRange { index, len } => {
                write!(f, "slide index out of range (index={index}, len={len})")
            }
        }
    }
}

impl std::error::Error for KnitError {}

fn push_head(out: &mut String, deck: &SlideDeck) {
    out.push_str("<head>\n");
    out.push_str("<meta charset=\"UTF-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    for meta in deck.extra_meta() {
        out.push_str(meta);
        out.push('\n');
    }
    out.push_str("<title>");
    out.push_str(deck.title());
    out.push_str("</title>\n");

    // The deck model keeps external scripts de-duplicated with the charting
    // CDN present exactly once; emission is a straight pass.
    for url in deck.external_scripts() {
        out.push_str("<script src=\"");
        out.push_str(url);
        out.push_str("\"></script>\n");
    }

    if !deck.css().is_empty() {
        out.push_str("<style>\n");
        out.push_str(deck.css());
        out.push_str("\n</style>\n");
    }
    out.push_str("</head>\n");
}

/// Emits the full presentation document: doctype, head, slide markup in deck
/// order, then one aggregated script block with every slide's script wrapped in
/// an isolating closure so identically named locals never collide.
pub fn knit_deck(deck: &SlideDeck) -> String {
    let mut out = String::with_capacity(estimate_len(deck));
    out.push_str("<!DOCTYPE html>\n<html>\n");
    push_head(&mut out, deck);
    out.push_str("<body>\n");

    for slide in deck.slides() {
        out.push_str(slide.html());
        out.push('\n');
    }

    let scripted = deck
        .slides()
        .iter()
        .filter(|slide| !slide.scripts().is_empty())
        .collect::<Vec<_>>();
    if !scripted.is_empty() {
        out.push_str("<script>\n");
        for (index, slide) in scripted.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(CLOSURE_OPEN);
            out.push('\n');
            out.push_str(slide.scripts());
            out.push('\n');
            out.push_str(CLOSURE_CLOSE);
            out.push('\n');
        }
        out.push_str("</script>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

/// Emits a standalone document containing only slide `index`: same head shape,
/// but the slide's own script unwrapped (no closure needed in isolation).
pub fn knit_slide(deck: &SlideDeck, index: usize) -> Result<String, KnitError> {
    let Some(slide) = deck.slides().get(index) else {
        return Err(KnitError::SlideIndexOutOfRange {
            index,
            len: deck.slide_count(),
        });
    };

    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n");
    push_head(&mut out, deck);
    out.push_str("<body>\n");
    out.push_str(slide.html());
    out.push('\n');
    if !slide.scripts().is_empty() {
        out.push_str("<script>\n");
        out.push_str(slide.scripts());
        out.push_str("\n</script>\n");
    }
    out.push_str("</body>\n</html>\n");
    Ok(out)
}

fn estimate_len(deck: &SlideDeck) -> usize {
    let slides: usize = deck
        .slides()
        .iter()
        .map(|slide| slide.html().len() + slide.scripts().len() + 64)
        .sum();
    slides + deck.css().len() + 512
}
