// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use proteus::model::{slide_label, ChatRole, DeckSession, SessionId, Slide, SlideDeck};
use proteus::verify::{ContentHash, VerificationRecord};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let pid = std::process::id();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut path = std::env::temp_dir();
        path.push(format!("proteus_bench_{prefix}_{pid}_{nanos}_{counter}"));
        std::fs::create_dir_all(&path).expect("create temp dir");

        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Small,
    Medium,
    LargeLongText,
}

impl Case {
    pub fn id(self) -> &'static str {
        match self {
            Case::Small => "small",
            Case::Medium => "medium",
            Case::LargeLongText => "large_long_text",
        }
    }

    pub fn slide_count(self) -> usize {
        match self {
            Case::Small => 5,
            Case::Medium => 20,
            Case::LargeLongText => 60,
        }
    }

    fn body_paragraphs(self) -> usize {
        match self {
            Case::Small => 1,
            Case::Medium => 3,
            Case::LargeLongText => 12,
        }
    }
}

fn ascii_repeat_to_len(prefix: &str, fill: char, target_len: usize) -> String {
    if prefix.len() >= target_len {
        return prefix[..target_len].to_owned();
    }

    let mut out = String::with_capacity(target_len);
    out.push_str(prefix);
    while out.len() < target_len {
        out.push(fill);
    }
    out
}

fn slide_html(case: Case, index: usize) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"slide\">\n");
    html.push_str(&format!("<h2>Section {index}</h2>\n"));
    for paragraph in 0..case.body_paragraphs() {
        let text = ascii_repeat_to_len(&format!("para {index}.{paragraph} "), 'x', 96);
        html.push_str(&format!("<p>{text}</p>\n"));
    }
    if index % 2 == 0 {
        html.push_str(&format!(
            "<div class=\"chart-wrap\"><canvas id=\"chart{index}\"></canvas></div>\n"
        ));
    }
    html.push_str("</div>");
    html
}

fn slide_scripts(index: usize) -> String {
    if index % 2 == 0 {
        format!(
            "new Chart(document.getElementById('chart{index}'), {{\n  type: 'bar',\n  data: {{ labels: ['A', 'B', 'C'], datasets: [{{ data: [{index}, 2, 3] }}] }}\n}});"
        )
    } else {
        String::new()
    }
}

pub fn deck(case: Case) -> SlideDeck {
    let mut deck = SlideDeck::new(format!("Benchmark Deck ({})", case.id()));
    deck.set_css(
        ".slide { width: 1280px; height: 720px; padding: 48px; }\nh2 { color: #1a1a2e; }\n.chart-wrap { height: 420px; }",
    );
    for index in 0..case.slide_count() {
        deck.slides_mut().push(Slide::new(
            slide_label(index),
            slide_html(case, index),
            slide_scripts(index),
        ));
    }
    deck
}

pub fn session(case: Case) -> DeckSession {
    let mut session = DeckSession::new(SessionId::new("bench").expect("session id"));
    session.set_deck(deck(case));
    for index in 0..case.slide_count() {
        session.push_message(ChatRole::User, format!("edit slide {index}"));
    }
    let hashes: Vec<ContentHash> = session
        .deck()
        .slides()
        .iter()
        .map(|slide| ContentHash::of_content(slide.html()))
        .collect();
    for hash in hashes {
        session.verification_mut().record(
            hash,
            VerificationRecord::new(serde_json::json!({ "verdict": "pass" })),
        );
    }
    session
}

pub fn checksum_str(text: &str) -> u64 {
    let mut acc = 0u64;
    for byte in text.as_bytes() {
        acc = acc.wrapping_mul(131).wrapping_add(u64::from(*byte));
    }
    acc
}

pub fn checksum_deck(deck: &SlideDeck) -> u64 {
    let mut acc = checksum_str(deck.title());
    acc = acc.wrapping_mul(131).wrapping_add(deck.css().len() as u64);
    acc = acc.wrapping_mul(131).wrapping_add(deck.rev());
    for script in deck.external_scripts() {
        acc = acc.wrapping_mul(131).wrapping_add(script.len() as u64);
    }
    for slide in deck.slides() {
        acc = acc
            .wrapping_mul(131)
            .wrapping_add(slide.slide_id().as_str().len() as u64);
        acc = acc.wrapping_mul(131).wrapping_add(slide.html().len() as u64);
        acc = acc
            .wrapping_mul(131)
            .wrapping_add(slide.scripts().len() as u64);
    }
    acc
}

pub fn checksum_session(session: &DeckSession) -> u64 {
    let mut acc = checksum_deck(session.deck());
    acc = acc
        .wrapping_mul(131)
        .wrapping_add(session.chat().len() as u64);
    acc = acc
        .wrapping_mul(131)
        .wrapping_add(session.verification().records().len() as u64);
    acc = acc
        .wrapping_mul(131)
        .wrapping_add(session.versions().len() as u64);
    acc
}
