// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Selector-level CSS rule merger.
//!
//! A selector present in the replacement stylesheet fully replaces the existing
//! block for that selector (whole-block replace, not per-property union). Output
//! order is deterministic: existing selectors first, then new selectors in
//! replacement order. Unparsable replacement CSS is a logged no-op.

#[derive(Debug, Clone, PartialEq, Eq)]
struct CssRule {
    selector: String,
    /// `None` for block-less at-statements like `@import ...`.
    block: Option<String>,
}

/// Permissive selector/block tokenizer. At-rules with bodies (`@media`, ...)
/// are kept as single units, nested braces and all. Returns `None` only when
/// braces are unbalanced beyond repair.
fn parse_rules(css: &str) -> Option<Vec<CssRule>> {
    let bytes = css.as_bytes();
    let mut rules = Vec::new();
    // Selector text accumulates here so comment spans never leak into it.
    let mut selector_buf = String::new();
    let mut selector_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                selector_buf.push_str(&css[selector_start..i]);
                let close = css[i + 2..].find("*/")?;
                i += 2 + close + 2;
                selector_start = i;
            }
            b';' => {
                selector_buf.push_str(&css[selector_start..i]);
                let statement = selector_buf.trim();
                if !statement.is_empty() {
                    rules.push(CssRule {
                        selector: statement.to_owned(),
                        block: None,
                    });
                }
                selector_buf.clear();
                i += 1;
                selector_start = i;
            }
            b'{' => {
                selector_buf.push_str(&css[selector_start..i]);
                let selector = selector_buf.trim().to_owned();
                selector_buf.clear();
                let block_start = i + 1;
                let mut depth = 1usize;
                let mut j = block_start;
                while j < bytes.len() && depth > 0 {
                    match bytes[j] {
                        b'{' => depth += 1,
                        b'}' => depth -= 1,
                        b'/' if bytes.get(j + 1) == Some(&b'*') => {
                            let close = css[j + 2..].find("*/")?;
                            j += 2 + close + 1;
                        }
                        _ => {}
                    }
                    j += 1;
                }
                if depth > 0 {
                    return None;
                }
                if !selector.is_empty() {
                    rules.push(CssRule {
                        selector,
                        block: Some(css[block_start..j - 1].trim().to_owned()),
                    });
                }
                i = j;
                selector_start = i;
            }
            b'}' => return None,
            _ => i += 1,
        }
    }

    selector_buf.push_str(&css[selector_start..]);
    if !selector_buf.trim().is_empty() {
        // Trailing selector without a block.
        return None;
    }

    Some(rules)
}

fn emit_rules(rules: &[CssRule]) -> String {
    let mut out = String::new();
    for rule in rules {
        if !out.is_empty() {
            out.push('\n');
        }
        match &rule.block {
            Some(block) => {
                out.push_str(&rule.selector);
                out.push_str(" {\n");
                for line in block.lines() {
                    out.push_str("  ");
                    out.push_str(line.trim());
                    out.push('\n');
                }
                out.push('}');
                out.push('\n');
            }
            None => {
                out.push_str(&rule.selector);
                out.push_str(";\n");
            }
        }
    }
    out
}

/// Merges a partial replacement stylesheet into the deck stylesheet.
pub fn merge_css(existing: &str, replacement: &str) -> String {
    if replacement.trim().is_empty() {
        return existing.to_owned();
    }

    let Some(replacement_rules) = parse_rules(replacement) else {
        log::warn!("replacement css is unparsable; keeping existing stylesheet unchanged");
        return existing.to_owned();
    };

    let Some(existing_rules) = parse_rules(existing) else {
        // Existing stylesheet is opaque to the tokenizer; preserve it verbatim
        // and append the replacement after it rather than losing either side.
        log::warn!("existing css is unparsable; appending replacement rules verbatim");
        let mut out = existing.to_owned();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&emit_rules(&replacement_rules));
        return out;
    };

    let mut merged = Vec::with_capacity(existing_rules.len() + replacement_rules.len());
    for rule in &existing_rules {
        match replacement_rules
            .iter()
            .find(|candidate| candidate.selector == rule.selector)
        {
            Some(replacement_rule) => merged.push(replacement_rule.clone()),
            None => merged.push(rule.clone()),
        }
    }
    for rule in &replacement_rules {
        if !existing_rules
            .iter()
            .any(|existing_rule| existing_rule.selector == rule.selector)
        {
            merged.push(rule.clone());
        }
    }

    emit_rules(&merged)
}
