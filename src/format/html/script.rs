// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Script partitioner.
//!
//! Splits a combined chart-initialization script into per-chart segments whose
//! concatenation reproduces the input byte-for-byte. No statement is ever dropped,
//! only grouped. Boundary priority: `// Canvas: <id>` markers, then `// Chart N:`
//! markers, then structural boundaries between canvas references. When boundaries
//! cannot be determined unambiguously the whole input stays one segment listing
//! every referenced canvas id.

use std::sync::OnceLock;

use regex::Regex;
use smallvec::SmallVec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSegment {
    code: String,
    canvas_ids: Vec<String>,
}

impl ScriptSegment {
    pub fn new(code: impl Into<String>, canvas_ids: Vec<String>) -> Self {
        Self {
            code: code.into(),
            canvas_ids,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn canvas_ids(&self) -> &[String] {
        &self.canvas_ids
    }
}

fn canvas_ref_regex() -> &'static Regex {
    static CANVAS_REF: OnceLock<Regex> = OnceLock::new();
    CANVAS_REF.get_or_init(|| {
        Regex::new(
            r#"getElementById\s*\(\s*['"]([^'"]+)['"]|querySelector\s*\(\s*['"]#([^'"]+)['"]"#,
        )
        .expect("hard-coded canvas reference regex is valid")
    })
}

fn dynamic_ref_regex() -> &'static Regex {
    static DYNAMIC_REF: OnceLock<Regex> = OnceLock::new();
    DYNAMIC_REF.get_or_init(|| {
        Regex::new(r#"(?:getElementById|querySelector)\s*\(\s*[^'")\s]"#)
            .expect("hard-coded dynamic lookup regex is valid")
    })
}

fn canvas_marker_regex() -> &'static Regex {
    static CANVAS_MARKER: OnceLock<Regex> = OnceLock::new();
    CANVAS_MARKER.get_or_init(|| {
        Regex::new(r"^[ \t]*//[ \t]*Canvas:[ \t]*(\S+)")
            .expect("hard-coded canvas marker regex is valid")
    })
}

fn chart_marker_regex() -> &'static Regex {
    static CHART_MARKER: OnceLock<Regex> = OnceLock::new();
    CHART_MARKER.get_or_init(|| {
        Regex::new(r"^[ \t]*//[ \t]*Chart[ \t]*\d+[ \t]*:")
            .expect("hard-coded chart marker regex is valid")
    })
}

/// Canvas ids referenced via `getElementById('<id>')` or `querySelector('#<id>')`,
/// de-duplicated, in first-reference order.
pub fn canvas_refs(script: &str) -> Vec<String> {
    let mut ids = Vec::new();
    for captures in canvas_ref_regex().captures_iter(script) {
        let id = captures
            .get(1)
            .or_else(|| captures.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        if !id.is_empty() && !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_owned());
        }
    }
    ids
}

/// Splits a combined script into per-chart segments.
pub fn partition_script(script: &str) -> Vec<ScriptSegment> {
    if script.is_empty() {
        return Vec::new();
    }

    if let Some(segments) = partition_at_markers(script, canvas_marker_regex(), true) {
        return segments;
    }
    if let Some(segments) = partition_at_markers(script, chart_marker_regex(), false) {
        return segments;
    }

    partition_structurally(script)
}

/// Splits at every line matching `marker`. Returns `None` when fewer than one
/// marker line exists. The text before the first marker rides with the first
/// segment so nothing is lost.
fn partition_at_markers(
    script: &str,
    marker: &Regex,
    marker_captures_id: bool,
) -> Option<Vec<ScriptSegment>> {
    let mut boundaries = Vec::new();
    let mut marker_ids = Vec::new();
    let mut line_start = 0;

    for line in script.split_inclusive('\n') {
        if let Some(captures) = marker.captures(line.trim_end_matches(['\n', '\r'])) {
            boundaries.push(line_start);
            marker_ids.push(if marker_captures_id {
                captures.get(1).map(|m| m.as_str().to_owned())
            } else {
                None
            });
        }
        line_start += line.len();
    }

    if boundaries.is_empty() {
        return None;
    }

    let mut segments = Vec::with_capacity(boundaries.len());
    for (index, &start) in boundaries.iter().enumerate() {
        let end = boundaries.get(index + 1).copied().unwrap_or(script.len());
        // Prelude before the first marker rides with the first segment.
        let code_start = if index == 0 { 0 } else { start };
        let code = &script[code_start..end];

        let mut ids = canvas_refs(code);
        if let Some(Some(marker_id)) = marker_ids.get(index) {
            if let Some(position) = ids.iter().position(|id| id == marker_id) {
                ids.remove(position);
            }
            ids.insert(0, marker_id.clone());
        }
        segments.push(ScriptSegment::new(code, ids));
    }

    Some(segments)
}

/// A maximal run of source text ending at a newline at nesting depth zero.
/// Multi-line chart configs stay inside one chunk because their braces and
/// parens keep the depth positive.
#[derive(Debug)]
struct Chunk<'a> {
    code: &'a str,
    ids: Vec<String>,
}

fn partition_structurally(script: &str) -> Vec<ScriptSegment> {
    // A lookup through a variable (one loop driving several canvases) hides
    // which statements belong to which chart; keep the whole script together.
    if dynamic_ref_regex().is_match(script) {
        return vec![ScriptSegment::new(script, canvas_refs(script))];
    }

    let chunks = lex_chunks(script);

    // A single chunk touching several canvases (one loop driving them all,
    // shared data prep, ...) cannot be split without guessing.
    if chunks.iter().any(|chunk| chunk.ids.len() > 1) {
        return vec![ScriptSegment::new(script, canvas_refs(script))];
    }

    let mut segments: Vec<(String, Option<String>)> = Vec::new();
    let mut prelude = String::new();

    for chunk in &chunks {
        match chunk.ids.first() {
            None => match segments.last_mut() {
                Some((code, _)) => code.push_str(chunk.code),
                None => prelude.push_str(chunk.code),
            },
            Some(id) => match segments.last_mut() {
                Some((code, Some(current))) if current == id => code.push_str(chunk.code),
                _ => {
                    let mut code = std::mem::take(&mut prelude);
                    code.push_str(chunk.code);
                    segments.push((code, Some(id.clone())));
                }
            },
        }
    }

    if segments.is_empty() {
        // No canvas reference anywhere: the whole blob is one segment.
        return vec![ScriptSegment::new(script, Vec::new())];
    }
    if !prelude.is_empty() {
        // Unreachable by construction (prelude is consumed by the first id'd
        // segment), but stay lossless if the grouping ever changes.
        segments
            .first_mut()
            .expect("segments is non-empty")
            .0
            .insert_str(0, &prelude);
    }

    // Interleaved references (a - b - a) mean the middle boundary was a guess.
    // Scoped so the borrow of `segments` ends before the move below.
    {
        let mut seen = SmallVec::<[&str; 8]>::new();
        for (_, id) in &segments {
            let id = id.as_deref().expect("structural segments carry an id");
            if seen.contains(&id) {
                return vec![ScriptSegment::new(script, canvas_refs(script))];
            }
            seen.push(id);
        }
    }

    segments
        .into_iter()
        .map(|(code, id)| {
            let mut ids = canvas_refs(&code);
            debug_assert_eq!(ids.len(), 1);
            if ids.is_empty() {
                ids.extend(id);
            }
            ScriptSegment::new(code, ids)
        })
        .collect()
}

/// Permissive JS lexer: tracks strings, template literals, comments, and
/// bracket depth, and cuts chunk boundaries at depth-zero newlines.
fn lex_chunks(script: &str) -> Vec<Chunk<'_>> {
    #[derive(PartialEq)]
    enum State {
        Code,
        LineComment,
        BlockComment,
        Single,
        Double,
        Template,
    }

    let bytes = script.as_bytes();
    let mut chunks = Vec::new();
    let mut state = State::Code;
    let mut depth = 0usize;
    let mut chunk_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match state {
            State::Code => match b {
                b'/' if bytes.get(i + 1) == Some(&b'/') => {
                    state = State::LineComment;
                    i += 1;
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    state = State::BlockComment;
                    i += 1;
                }
                b'\'' => state = State::Single,
                b'"' => state = State::Double,
                b'`' => state = State::Template,
                b'{' | b'(' | b'[' => depth += 1,
                b'}' | b')' | b']' => depth = depth.saturating_sub(1),
                b'\n' if depth == 0 => {
                    let code = &script[chunk_start..=i];
                    chunks.push(Chunk {
                        code,
                        ids: canvas_refs(code),
                    });
                    chunk_start = i + 1;
                }
                _ => {}
            },
            State::LineComment => {
                if b == b'\n' {
                    state = State::Code;
                    if depth == 0 {
                        let code = &script[chunk_start..=i];
                        chunks.push(Chunk {
                            code,
                            ids: canvas_refs(code),
                        });
                        chunk_start = i + 1;
                    }
                }
            }
            State::BlockComment => {
                if b == b'*' && bytes.get(i + 1) == Some(&b'/') {
                    state = State::Code;
                    i += 1;
                }
            }
            State::Single => match b {
                b'\\' => i += 1,
                b'\'' | b'\n' => state = State::Code,
                _ => {}
            },
            State::Double => match b {
                b'\\' => i += 1,
                b'"' | b'\n' => state = State::Code,
                _ => {}
            },
            State::Template => match b {
                b'\\' => i += 1,
                b'`' => state = State::Code,
                _ => {}
            },
        }
        i += 1;
    }

    if chunk_start < script.len() {
        let code = &script[chunk_start..];
        chunks.push(Chunk {
            code,
            ids: canvas_refs(code),
        });
    }

    chunks
}

/// Rewrites quoted references to `old_id` (with or without a `#` prefix) to
/// `new_id`. Used when a freshly inserted slide's canvas was renamed to avoid a
/// collision; only that slide's own script is ever passed here.
pub fn rewrite_canvas_refs(script: &str, old_id: &str, new_id: &str) -> String {
    let mut out = script.to_owned();
    for quote in ['\'', '"', '`'] {
        for prefix in ["", "#"] {
            let from = format!("{quote}{prefix}{old_id}{quote}");
            let to = format!("{quote}{prefix}{new_id}{quote}");
            out = out.replace(&from, &to);
        }
    }
    out
}
