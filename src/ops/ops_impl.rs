// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Range-replacement implementation helpers used by `apply_ops`.
/// Keeps `ops::mod` focused on public op types and orchestration.

/// Hands out slide labels that continue past every numeric label already in the
/// deck, so labels are never reused within a batch even after removals.
#[derive(Debug)]
struct SlideLabeler {
    next_ordinal: usize,
}

impl SlideLabeler {
    fn for_deck(deck: &SlideDeck) -> Self {
        let next_ordinal = deck
            .slides()
            .iter()
            .filter_map(|slide| slide.slide_id().as_str().strip_prefix("slide-"))
            .filter_map(|suffix| suffix.parse::<usize>().ok())
            .map(|ordinal| ordinal + 1)
            .max()
            .unwrap_or(0);
        Self { next_ordinal }
    }

    fn next(&mut self) -> SlideId {
        let label = slide_label(self.next_ordinal);
        self.next_ordinal += 1;
        label
    }
}

/// Resolves the target index for a pure insertion from the caller's selection.
/// A selection pointing past the live deck is a state divergence; the engine
/// fails closed to position 0 and logs it instead of erroring.
fn resolve_insert_index(deck: &SlideDeck, position: AddPosition, anchor: &[usize]) -> usize {
    let len = deck.slide_count();

    if let Some(&max_selected) = anchor.iter().max() {
        if max_selected >= len {
            log::warn!(
                "selection index {max_selected} exceeds live slide count {len}; inserting at position 0"
            );
            return 0;
        }
    }

    match position {
        AddPosition::Beginning => 0,
        AddPosition::End => len,
        AddPosition::Before => anchor.iter().min().copied().unwrap_or(0),
        AddPosition::After => anchor
            .iter()
            .max()
            .map(|&max_selected| max_selected + 1)
            .unwrap_or(len),
    }
}

/// Core of every range mutation: removes `count` slides at `start` (clamped),
/// manufactures `slides` with fresh labels and collision-free canvas ids, and
/// splices them in. Postcondition: no duplicate canvas id anywhere in the deck.
fn apply_replace(
    deck: &mut SlideDeck,
    start: usize,
    count: usize,
    slides: &[NewSlide],
    labeler: &mut SlideLabeler,
    delta: &mut DeltaBuilder,
) {
    let len = deck.slide_count();
    let start = if start > len {
        log::warn!("replace start {start} exceeds slide count {len}; clamping");
        len
    } else {
        start
    };
    let count = if count > len - start {
        log::warn!(
            "replace count {count} exceeds remaining slides ({}); clamping",
            len - start
        );
        len - start
    } else {
        count
    };

    for slide in deck.slides_mut().drain(start..start + count) {
        delta.record_removed(slide.slide_id().clone());
    }

    if slides.is_empty() {
        return;
    }

    let mut taken_canvas_ids = deck
        .slides()
        .iter()
        .flat_map(|slide| element_ids(slide.html()))
        .collect::<BTreeSet<String>>();

    let manufactured = slides
        .iter()
        .map(|new_slide| {
            let slide = manufacture_slide(new_slide, labeler, &mut taken_canvas_ids, delta);
            delta.record_added(slide.slide_id().clone());
            slide
        })
        .collect::<Vec<_>>();

    deck.slides_mut().splice(start..start, manufactured);
}

/// Builds a committed slide from a proposed fragment, renaming any canvas id
/// that collides with the rest of the deck. Ids are committed per occurrence,
/// so a fragment repeating the same id within itself collides with its own
/// first occurrence and gets a distinct rename. Scripts follow the first
/// occurrence of each proposed id because that is the element DOM lookups
/// resolve to. Only this slide's own markup and script are rewritten; other
/// slides are never touched.
fn manufacture_slide(
    new_slide: &NewSlide,
    labeler: &mut SlideLabeler,
    taken_canvas_ids: &mut BTreeSet<String>,
    delta: &mut DeltaBuilder,
) -> Slide {
    let mut html = String::with_capacity(new_slide.html.len());
    let mut scripts = new_slide.scripts.clone();
    let mut cursor = 0;
    let mut first_seen = BTreeSet::new();

    for (span, canvas_id) in element_id_spans(&new_slide.html) {
        html.push_str(&new_slide.html[cursor..span.start]);
        cursor = span.end;

        let is_first = first_seen.insert(canvas_id.clone());
        if taken_canvas_ids.contains(&canvas_id) {
            let renamed = free_canvas_id(&canvas_id, taken_canvas_ids);
            html.push_str(&renamed);
            if is_first {
                scripts = rewrite_canvas_refs(&scripts, &canvas_id, &renamed);
            }
            delta.record_canvas_rename(canvas_id, renamed.clone());
            taken_canvas_ids.insert(renamed);
        } else {
            html.push_str(&canvas_id);
            taken_canvas_ids.insert(canvas_id);
        }
    }
    html.push_str(&new_slide.html[cursor..]);

    Slide::new(labeler.next(), html, scripts)
}

/// First `<id>-2`, `<id>-3`, ... not already taken.
fn free_canvas_id(canvas_id: &str, taken_canvas_ids: &BTreeSet<String>) -> String {
    let mut suffix = 2usize;
    loop {
        let candidate = format!("{canvas_id}-{suffix}");
        if !taken_canvas_ids.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

fn apply_reorder(
    deck: &mut SlideDeck,
    order: &[usize],
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    let len = deck.slide_count();
    let mut seen = vec![false; len];
    let valid = order.len() == len
        && order.iter().all(|&old_index| {
            old_index < len && !std::mem::replace(&mut seen[old_index], true)
        });
    if !valid {
        return Err(ApplyError::InvalidPermutation {
            expected_len: len,
            order: order.to_vec(),
        });
    }

    let reordered = order
        .iter()
        .map(|&old_index| deck.slides()[old_index].clone())
        .collect::<Vec<_>>();
    for (new_index, &old_index) in order.iter().enumerate() {
        if new_index != old_index {
            delta.record_updated(reordered[new_index].slide_id().clone());
        }
    }
    *deck.slides_mut() = reordered;
    Ok(())
}
