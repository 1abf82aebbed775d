// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! HTML surface of the deck model: parsing generated documents into decks,
//! partitioning chart scripts, merging stylesheets, and knitting decks back
//! into renderable documents.

pub mod css;
pub mod knit;
pub mod parse;
pub mod scan;
pub mod script;

pub use css::merge_css;
pub use knit::{knit_deck, knit_slide, KnitError};
pub use parse::parse_deck;
pub use script::{canvas_refs, partition_script, rewrite_canvas_refs, ScriptSegment};
