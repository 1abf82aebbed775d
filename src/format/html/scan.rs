// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tolerant tag-soup scanner.
//!
//! Emits raw events (text, comment, doctype, open/close tag) with byte spans over the
//! source. Never fails: unterminated constructs degrade to text or run to end of input.
//! LLM-generated markup is routinely sloppy, so "renderable" beats "well-formed" here.

use std::ops::Range;

use memchr::memchr;
use smallvec::SmallVec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr<'a> {
    pub name: &'a str,
    /// `None` for bare boolean attributes.
    pub value: Option<&'a str>,
}

pub type Attrs<'a> = SmallVec<[Attr<'a>; 8]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEventKind<'a> {
    Text(&'a str),
    Comment(&'a str),
    Doctype,
    Open {
        name: &'a str,
        attrs: Attrs<'a>,
        self_closing: bool,
    },
    Close {
        name: &'a str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEvent<'a> {
    pub kind: TagEventKind<'a>,
    /// Byte offset of the event's first byte in the source.
    pub start: usize,
    /// Byte offset one past the event's last byte.
    pub end: usize,
}

/// Elements whose content is raw text until the matching close tag.
const RAW_TEXT_ELEMENTS: [&str; 3] = ["script", "style", "title"];

/// Elements that never have a close tag; treated as self-closing for depth tracking.
pub fn is_void_element(name: &str) -> bool {
    const VOID: [&str; 14] = [
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ];
    VOID.iter().any(|void| name.eq_ignore_ascii_case(void))
}

#[derive(Debug)]
pub struct TagScanner<'a> {
    src: &'a str,
    pos: usize,
    raw_text_element: Option<&'static str>,
}

impl<'a> TagScanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            raw_text_element: None,
        }
    }

    fn emit(&mut self, kind: TagEventKind<'a>, start: usize, end: usize) -> TagEvent<'a> {
        self.pos = end;
        TagEvent { kind, start, end }
    }

    fn next_raw_text(&mut self, element: &'static str) -> TagEvent<'a> {
        let start = self.pos;
        match find_close_tag_ci(self.src, start, element) {
            Some(close_start) => {
                self.raw_text_element = None;
                if close_start > start {
                    return self.emit(
                        TagEventKind::Text(&self.src[start..close_start]),
                        start,
                        close_start,
                    );
                }
                // Empty raw text: fall through to normal close-tag parsing.
                self.next_event().expect("close tag follows at close_start")
            }
            None => {
                // Unterminated raw-text element: the rest of the input is its content.
                self.raw_text_element = None;
                self.emit(TagEventKind::Text(&self.src[start..]), start, self.src.len())
            }
        }
    }

    fn next_event(&mut self) -> Option<TagEvent<'a>> {
        if self.pos >= self.src.len() {
            return None;
        }

        if let Some(element) = self.raw_text_element {
            return Some(self.next_raw_text(element));
        }

        let start = self.pos;
        let bytes = self.src.as_bytes();

        if bytes[start] != b'<' {
            let end = match memchr(b'<', &bytes[start..]) {
                Some(offset) => start + offset,
                None => self.src.len(),
            };
            return Some(self.emit(TagEventKind::Text(&self.src[start..end]), start, end));
        }

        let rest = &self.src[start..];

        if rest.starts_with("<!--") {
            return Some(match rest[4..].find("-->") {
                Some(inner_end) => {
                    let comment = &rest[4..4 + inner_end];
                    self.emit(TagEventKind::Comment(comment), start, start + 4 + inner_end + 3)
                }
                // Unterminated comment swallows the rest of the input.
                None => self.emit(TagEventKind::Comment(&rest[4..]), start, self.src.len()),
            });
        }

        if rest.starts_with("<!") {
            return Some(match memchr(b'>', rest.as_bytes()) {
                Some(gt) => self.emit(TagEventKind::Doctype, start, start + gt + 1),
                None => self.emit(TagEventKind::Doctype, start, self.src.len()),
            });
        }

        if let Some(after_slash) = rest.strip_prefix("</") {
            let name_len = tag_name_len(after_slash);
            if name_len == 0 {
                // `</` followed by junk: treat the `<` as text.
                return Some(self.emit(TagEventKind::Text(&self.src[start..start + 1]), start, start + 1));
            }
            let name = &after_slash[..name_len];
            let end = match memchr(b'>', rest.as_bytes()) {
                Some(gt) => start + gt + 1,
                None => self.src.len(),
            };
            return Some(self.emit(TagEventKind::Close { name }, start, end));
        }

        let after_lt = &rest[1..];
        let name_len = tag_name_len(after_lt);
        if name_len == 0 {
            // Stray `<` in text.
            return Some(self.emit(TagEventKind::Text(&self.src[start..start + 1]), start, start + 1));
        }

        let name = &after_lt[..name_len];
        let (attrs, self_closing, consumed) = parse_attrs(&after_lt[name_len..]);
        let end = start + 1 + name_len + consumed;

        if !self_closing {
            if let Some(raw) = RAW_TEXT_ELEMENTS
                .iter()
                .copied()
                .find(|raw| name.eq_ignore_ascii_case(raw))
            {
                self.raw_text_element = Some(raw);
            }
        }

        Some(self.emit(
            TagEventKind::Open {
                name,
                attrs,
                self_closing,
            },
            start,
            end,
        ))
    }
}

impl<'a> Iterator for TagScanner<'a> {
    type Item = TagEvent<'a>;

    fn next(&mut self) -> Option<TagEvent<'a>> {
        self.next_event()
    }
}

fn tag_name_len(rest: &str) -> usize {
    let bytes = rest.as_bytes();
    if !bytes.first().is_some_and(|b| b.is_ascii_alphabetic()) {
        return 0;
    }
    bytes
        .iter()
        .position(|b| !b.is_ascii_alphanumeric() && *b != b'-' && *b != b':')
        .unwrap_or(bytes.len())
}

/// Parses the attribute list following a tag name, up to and including the
/// closing `>`. Returns `(attrs, self_closing, bytes_consumed)`. An unterminated
/// tag consumes the rest of the input.
fn parse_attrs(rest: &str) -> (Attrs<'_>, bool, usize) {
    let bytes = rest.as_bytes();
    let mut attrs = Attrs::new();
    let mut self_closing = false;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if b == b'>' {
            return (attrs, self_closing, i + 1);
        }
        if b == b'/' {
            self_closing = true;
            i += 1;
            continue;
        }
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        // Attribute name.
        let name_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && bytes[i] != b'='
            && bytes[i] != b'>'
            && bytes[i] != b'/'
        {
            i += 1;
        }
        if i == name_start {
            // Junk byte; skip it rather than failing.
            i += 1;
            continue;
        }
        let name = &rest[name_start..i];
        self_closing = false;

        // Optional `= value`.
        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j >= bytes.len() || bytes[j] != b'=' {
            attrs.push(Attr { name, value: None });
            continue;
        }
        j += 1;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }

        if j < bytes.len() && (bytes[j] == b'"' || bytes[j] == b'\'') {
            let quote = bytes[j];
            let value_start = j + 1;
            let value_end = memchr(quote, &bytes[value_start..])
                .map(|offset| value_start + offset)
                .unwrap_or(bytes.len());
            attrs.push(Attr {
                name,
                value: Some(&rest[value_start..value_end]),
            });
            i = (value_end + 1).min(bytes.len());
        } else {
            let value_start = j;
            while j < bytes.len()
                && !bytes[j].is_ascii_whitespace()
                && bytes[j] != b'>'
                && bytes[j] != b'/'
            {
                j += 1;
            }
            attrs.push(Attr {
                name,
                value: Some(&rest[value_start..j]),
            });
            i = j;
        }
    }

    (attrs, self_closing, bytes.len())
}

/// Finds the byte offset of `</element` (case-insensitive, at a tag boundary)
/// at or after `from`.
fn find_close_tag_ci(src: &str, from: usize, element: &str) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut pos = from;

    while pos < bytes.len() {
        let lt = pos + memchr(b'<', &bytes[pos..])?;
        let candidate = &src[lt..];
        if let Some(after_slash) = candidate.strip_prefix("</") {
            if after_slash.len() >= element.len()
                && after_slash[..element.len()].eq_ignore_ascii_case(element)
            {
                let boundary = after_slash.as_bytes().get(element.len());
                if !boundary.is_some_and(|b| b.is_ascii_alphanumeric()) {
                    return Some(lt);
                }
            }
        }
        pos = lt + 1;
    }

    None
}

pub fn attr_value<'a>(attrs: &Attrs<'a>, name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|attr| attr.name.eq_ignore_ascii_case(name))
        .map(|attr| attr.value.unwrap_or(""))
}

pub fn has_class_token(attrs: &Attrs<'_>, token: &str) -> bool {
    attr_value(attrs, "class")
        .is_some_and(|class| class.split_ascii_whitespace().any(|t| t == token))
}

/// All element `id` attributes in document order. Any id'd element nested in a
/// slide is a potential chart mount point, so this is also the canvas-id scan.
pub fn element_ids(html: &str) -> Vec<String> {
    let mut ids = Vec::new();
    for event in TagScanner::new(html) {
        if let TagEventKind::Open { attrs, .. } = &event.kind {
            if let Some(id) = attr_value(attrs, "id") {
                if !id.is_empty() {
                    ids.push(id.to_owned());
                }
            }
        }
    }
    ids
}

/// Byte span of every non-empty element `id` attribute value, in document
/// order. Spans cover the value only, quotes excluded, so splicing a
/// replacement id into the span works for quoted and unquoted attributes alike.
pub fn element_id_spans(html: &str) -> Vec<(Range<usize>, String)> {
    let base = html.as_ptr() as usize;
    let mut spans = Vec::new();
    for event in TagScanner::new(html) {
        if let TagEventKind::Open { attrs, .. } = &event.kind {
            let id = attrs
                .iter()
                .find(|attr| attr.name.eq_ignore_ascii_case("id"))
                .and_then(|attr| attr.value);
            if let Some(id) = id.filter(|id| !id.is_empty()) {
                let start = id.as_ptr() as usize - base;
                spans.push((start..start + id.len(), id.to_owned()));
            }
        }
    }
    spans
}

/// Ids that occur more than once, in first-duplicate order.
pub fn duplicate_element_ids(html: &str) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    let mut duplicates = Vec::new();
    for id in element_ids(html) {
        if !seen.insert(id.clone()) && !duplicates.contains(&id) {
            duplicates.push(id);
        }
    }
    duplicates
}
