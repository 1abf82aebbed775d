// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Deck parser.
//!
//! Splits raw presentation HTML into a [`SlideDeck`]: title, stylesheet, external
//! script URLs, and one [`Slide`] per slide-container element in document order.
//! Inline chart scripts are partitioned and assigned to the slide owning their
//! first resolvable canvas id; unresolvable segments go to the last slide (a
//! logged fallback, never silent loss). Parsing is best-effort and never fails:
//! degenerate input yields a degenerate but renderable deck.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{slide_label, Slide, SlideDeck};

use super::knit::{CLOSURE_CLOSE, CLOSURE_OPEN};
use super::scan::{attr_value, has_class_token, is_void_element, TagEventKind, TagScanner};
use super::script::partition_script;

/// The class token that marks a slide container element.
const SLIDE_CLASS_TOKEN: &str = "slide";

#[derive(Debug, Default)]
struct DocumentScan {
    title: Option<String>,
    css_parts: Vec<String>,
    external_scripts: Vec<String>,
    extra_meta: Vec<String>,
    /// Byte ranges of top-level slide container elements, in document order.
    slide_ranges: Vec<(usize, usize)>,
    /// Inline script bodies found outside any slide container, in document order.
    loose_scripts: Vec<String>,
}

fn scan_document(html: &str) -> DocumentScan {
    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Pending {
        None,
        Title,
        Style,
        InlineScript,
        ExternalScript,
    }

    let mut scan = DocumentScan::default();
    let mut pending = Pending::None;
    // (container tag name, nesting depth, outer start offset)
    let mut slide: Option<(String, usize, usize)> = None;

    for event in TagScanner::new(html) {
        match &event.kind {
            TagEventKind::Open {
                name,
                attrs,
                self_closing,
            } => {
                let in_slide = slide.is_some();

                match slide.as_mut() {
                    Some((container, depth, _)) => {
                        if name.eq_ignore_ascii_case(container)
                            && !*self_closing
                            && !is_void_element(name)
                        {
                            *depth += 1;
                        }
                    }
                    None => {
                        if has_class_token(attrs, SLIDE_CLASS_TOKEN) {
                            if *self_closing || is_void_element(name) {
                                scan.slide_ranges.push((event.start, event.end));
                            } else {
                                slide = Some((name.to_lowercase(), 1, event.start));
                            }
                            continue;
                        }
                    }
                }

                if name.eq_ignore_ascii_case("script") {
                    match attr_value(attrs, "src") {
                        Some(src) if !src.is_empty() => {
                            if !in_slide {
                                scan.external_scripts.push(src.to_owned());
                            }
                            pending = Pending::ExternalScript;
                        }
                        _ => pending = Pending::InlineScript,
                    }
                } else if !in_slide {
                    if name.eq_ignore_ascii_case("title") {
                        pending = Pending::Title;
                    } else if name.eq_ignore_ascii_case("style") {
                        pending = Pending::Style;
                    } else if name.eq_ignore_ascii_case("meta") {
                        let raw = html[event.start..event.end].trim();
                        if attr_value(attrs, "charset").is_none()
                            && attr_value(attrs, "name") != Some("viewport")
                        {
                            scan.extra_meta.push(raw.to_owned());
                        }
                    }
                }
            }
            TagEventKind::Text(text) => {
                let in_slide = slide.is_some();
                match pending {
                    Pending::Title if !in_slide => {
                        scan.title = Some(text.trim().to_owned());
                        pending = Pending::None;
                    }
                    Pending::Style if !in_slide => {
                        scan.css_parts.push(text.trim().to_owned());
                        pending = Pending::None;
                    }
                    Pending::InlineScript => {
                        if !in_slide && !text.trim().is_empty() {
                            scan.loose_scripts.push((*text).to_owned());
                        }
                        pending = Pending::None;
                    }
                    _ => {}
                }
            }
            TagEventKind::Close { name } => {
                pending = Pending::None;
                if let Some((container, depth, start)) = slide.as_mut() {
                    if name.eq_ignore_ascii_case(container) {
                        *depth -= 1;
                        if *depth == 0 {
                            scan.slide_ranges.push((*start, event.end));
                            slide = None;
                        }
                    }
                }
            }
            TagEventKind::Comment(_) | TagEventKind::Doctype => {}
        }
    }

    // Unclosed slide container: everything to end of input belongs to it.
    if let Some((_, _, start)) = slide {
        scan.slide_ranges.push((start, html.len()));
    }

    scan
}

/// Removes inline `<script>` elements embedded in a slide's markup and returns
/// the cleaned markup plus the concatenated script bodies. Leaving them inline
/// would double-emit on knit (once in markup, once in the aggregated block).
fn splice_embedded_scripts(outer_html: &str) -> (String, String) {
    let mut remove: Vec<(usize, usize)> = Vec::new();
    let mut scripts = String::new();
    let mut script_open: Option<usize> = None;
    let mut script_body = "";

    for event in TagScanner::new(outer_html) {
        match &event.kind {
            TagEventKind::Open { name, attrs, .. } if name.eq_ignore_ascii_case("script") => {
                if attr_value(attrs, "src").is_none() {
                    script_open = Some(event.start);
                    script_body = "";
                }
            }
            TagEventKind::Text(text) => {
                if script_open.is_some() {
                    script_body = *text;
                }
            }
            TagEventKind::Close { name } if name.eq_ignore_ascii_case("script") => {
                if let Some(start) = script_open.take() {
                    remove.push((start, event.end));
                    if !script_body.trim().is_empty() {
                        if !scripts.is_empty() && !scripts.ends_with('\n') {
                            scripts.push('\n');
                        }
                        scripts.push_str(script_body);
                    }
                    script_body = "";
                }
            }
            _ => {}
        }
    }

    if remove.is_empty() {
        return (outer_html.to_owned(), scripts);
    }

    let mut cleaned = String::with_capacity(outer_html.len());
    let mut cursor = 0;
    for (start, end) in remove {
        cleaned.push_str(&outer_html[cursor..start]);
        cursor = end;
    }
    cleaned.push_str(&outer_html[cursor..]);
    (cleaned, scripts)
}

/// Renames element ids already claimed by an earlier occurrence so a parsed
/// deck never carries a duplicate canvas id. Generated documents repeat ids
/// often enough that refusing them would make import unreliable. Scripts are
/// left untouched: a DOM lookup resolves to the first occurrence, which keeps
/// its id.
fn dedupe_element_ids(slide_html: &str, seen: &mut BTreeSet<String>) -> String {
    let mut out = String::with_capacity(slide_html.len());
    let mut cursor = 0;

    for (span, id) in super::scan::element_id_spans(slide_html) {
        out.push_str(&slide_html[cursor..span.start]);
        cursor = span.end;

        if seen.insert(id.clone()) {
            out.push_str(&id);
            continue;
        }
        let mut suffix = 2usize;
        let renamed = loop {
            let candidate = format!("{id}-{suffix}");
            if seen.insert(candidate.clone()) {
                break candidate;
            }
            suffix += 1;
        };
        log::warn!("duplicate element id {id:?} renamed to {renamed:?} while parsing");
        out.push_str(&renamed);
    }

    out.push_str(&slide_html[cursor..]);
    out
}

/// Strips the exact isolating wrappers `knit_deck` emits, returning the wrapped
/// bodies. Returns `None` when the code is not a pure sequence of wrappers; the
/// caller then treats the blob as ordinary script.
fn unwrap_isolating_closures(code: &str) -> Option<Vec<String>> {
    let mut rest = code.trim();
    if rest.is_empty() {
        return None;
    }

    let close_marker = format!("\n{CLOSURE_CLOSE}");
    let mut bodies = Vec::new();

    while !rest.is_empty() {
        rest = rest.strip_prefix(CLOSURE_OPEN)?;
        rest = rest.strip_prefix('\n').unwrap_or(rest);

        let mut search_from = 0;
        loop {
            let found = rest[search_from..].find(&close_marker)?;
            let end = search_from + found;
            let after = rest[end + close_marker.len()..].trim_start();
            if after.is_empty() || after.starts_with(CLOSURE_OPEN) {
                bodies.push(rest[..end].to_owned());
                rest = after;
                break;
            }
            search_from = end + 1;
        }
    }

    Some(bodies)
}

/// Parses raw presentation HTML into a deck. Never fails; see module docs.
pub fn parse_deck(html: &str) -> SlideDeck {
    let scan = scan_document(html);

    let mut deck = SlideDeck::new(scan.title.unwrap_or_else(|| "Presentation".to_owned()));
    deck.set_css(
        scan.css_parts
            .iter()
            .filter(|part| !part.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n"),
    );
    for url in &scan.external_scripts {
        deck.add_external_script(url.clone());
    }
    deck.extra_meta_mut().extend(scan.extra_meta);

    let mut canvas_to_slide: BTreeMap<String, usize> = BTreeMap::new();
    let mut seen_canvas_ids: BTreeSet<String> = BTreeSet::new();
    for (index, &(start, end)) in scan.slide_ranges.iter().enumerate() {
        let (slide_html, embedded_scripts) = splice_embedded_scripts(&html[start..end]);
        let slide_html = dedupe_element_ids(&slide_html, &mut seen_canvas_ids);

        for canvas_id in super::scan::element_ids(&slide_html) {
            canvas_to_slide.entry(canvas_id).or_insert(index);
        }

        deck.slides_mut()
            .push(Slide::new(slide_label(index), slide_html, embedded_scripts));
    }

    for blob in &scan.loose_scripts {
        let pieces = unwrap_isolating_closures(blob).unwrap_or_else(|| vec![blob.clone()]);
        for piece in pieces {
            assign_script_segments(&mut deck, &canvas_to_slide, &piece);
        }
    }

    deck
}

fn assign_script_segments(
    deck: &mut SlideDeck,
    canvas_to_slide: &BTreeMap<String, usize>,
    script: &str,
) {
    if deck.slides().is_empty() {
        if !script.trim().is_empty() {
            log::warn!("dropping inline script: document has no slide containers");
        }
        return;
    }

    let last_index = deck.slide_count() - 1;
    for segment in partition_script(script) {
        let target = segment
            .canvas_ids()
            .iter()
            .find_map(|id| canvas_to_slide.get(id).copied());

        let index = match target {
            Some(index) => index,
            None => {
                log::warn!(
                    "script segment references no known canvas (ids: {:?}); assigning to last slide",
                    segment.canvas_ids()
                );
                last_index
            }
        };
        deck.slides_mut()[index].append_script(segment.code().trim_matches('\n'));
    }
}
