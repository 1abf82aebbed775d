// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::slide::Slide;

/// The charting library every generated deck loads.
pub const CHART_CDN_URL: &str = "https://cdn.jsdelivr.net/npm/chart.js";

/// An ordered slide deck plus the shared CSS and script includes.
///
/// Slide order is the sole source of rendering order. Canvas ids are unique
/// across all slides at all times; the ops engine renames colliding ids on
/// insert/replace before committing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideDeck {
    title: String,
    css: String,
    external_scripts: Vec<String>,
    extra_meta: Vec<String>,
    slides: Vec<Slide>,
    rev: u64,
}

impl SlideDeck {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            css: String::new(),
            external_scripts: vec![CHART_CDN_URL.to_owned()],
            extra_meta: Vec::new(),
            slides: Vec::new(),
            rev: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn set_css(&mut self, css: impl Into<String>) {
        self.css = css.into();
    }

    pub fn external_scripts(&self) -> &[String] {
        &self.external_scripts
    }

    /// Records an external script URL, preserving first-seen order and
    /// never duplicating an already recorded URL.
    pub fn add_external_script(&mut self, url: impl Into<String>) {
        let url = url.into();
        if !self.external_scripts.iter().any(|existing| *existing == url) {
            self.external_scripts.push(url);
        }
    }

    /// Non-meta `<meta>` head tags recorded on parse and re-emitted on knit.
    /// Charset and viewport are normalized away because knit always emits them.
    pub fn extra_meta(&self) -> &[String] {
        &self.extra_meta
    }

    pub fn extra_meta_mut(&mut self) -> &mut Vec<String> {
        &mut self.extra_meta
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slides_mut(&mut self) -> &mut Vec<Slide> {
        &mut self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn set_rev(&mut self, rev: u64) {
        self.rev = rev;
    }

    pub fn bump_rev(&mut self) {
        self.rev = self.rev.saturating_add(1);
    }
}

impl Default for SlideDeck {
    fn default() -> Self {
        Self::new("Presentation")
    }
}
