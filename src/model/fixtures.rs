// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::deck::SlideDeck;
use super::ids::slide_label;
use super::slide::Slide;

/// The deck a brand-new session starts from: one title slide with a working
/// chart, so the export is renderable before the first edit.
pub(crate) fn hello_deck() -> SlideDeck {
    let mut deck = SlideDeck::new("New Presentation");
    deck.set_css(
        ".slide {\n  padding: 48px;\n  font-family: sans-serif;\n}\nh1 {\n  margin-top: 0;\n}",
    );
    deck.slides_mut().push(Slide::new(
        slide_label(0),
        "<div class=\"slide\">\n<h1>New Presentation</h1>\n<canvas id=\"welcomeChart\"></canvas>\n</div>",
        "new Chart(document.getElementById('welcomeChart'), {\n  type: 'bar',\n  data: { labels: ['A', 'B', 'C'], datasets: [{ data: [3, 1, 2] }] }\n});",
    ));
    deck
}

#[cfg(test)]
pub(crate) fn chart_deck(slide_count: usize) -> SlideDeck {
    let mut deck = SlideDeck::new("Fixture Deck");
    deck.set_css(".slide { margin: 0 auto; }");
    for index in 0..slide_count {
        deck.slides_mut().push(Slide::new(
            slide_label(index),
            format!(
                "<div class=\"slide\"><h2>Slide {index}</h2><canvas id=\"chart{index}\"></canvas></div>"
            ),
            format!("new Chart(document.getElementById('chart{index}'), {{ type: 'bar' }});"),
        ));
    }
    deck
}
