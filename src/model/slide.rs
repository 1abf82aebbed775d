// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::ids::SlideId;

/// A single slide: its wrapper markup plus the chart-initialization script it owns.
///
/// Invariant maintained by the ops engine: `scripts` never references a canvas id
/// that belongs to another slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    slide_id: SlideId,
    html: String,
    scripts: String,
}

impl Slide {
    pub fn new(slide_id: SlideId, html: impl Into<String>, scripts: impl Into<String>) -> Self {
        Self {
            slide_id,
            html: html.into(),
            scripts: scripts.into(),
        }
    }

    pub fn slide_id(&self) -> &SlideId {
        &self.slide_id
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn scripts(&self) -> &str {
        &self.scripts
    }

    pub fn set_html(&mut self, html: impl Into<String>) {
        self.html = html.into();
    }

    pub fn set_scripts(&mut self, scripts: impl Into<String>) {
        self.scripts = scripts.into();
    }

    /// Appends a script segment, separating it from any existing code with a newline.
    pub fn append_script(&mut self, code: &str) {
        if code.is_empty() {
            return;
        }
        if !self.scripts.is_empty() && !self.scripts.ends_with('\n') {
            self.scripts.push('\n');
        }
        self.scripts.push_str(code);
    }
}
