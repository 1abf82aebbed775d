// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use proteus::format::html::{knit_deck, parse_deck};
use proteus::ops::{apply_ops, DeckOp, NewSlide};
use proteus::store::{DeckFolder, SessionStore};
use proteus::verify::{ContentHash, VerificationRecord};

mod fixtures;
mod profiler;

use fixtures::TempDir;

fn edit_ops() -> Vec<DeckOp> {
    vec![
        DeckOp::ReplaceRange {
            start: 1,
            count: 1,
            slides: vec![NewSlide::new(
                "<div class=\"slide\"><h2>Rewritten</h2><canvas id=\"chart0\"></canvas></div>",
                "new Chart(document.getElementById('chart0'), { type: 'line' });",
            )],
        },
        DeckOp::SetTitle {
            title: "Edited Deck".to_owned(),
        },
    ]
}

// Full edit loop: parse the incoming document, apply an edit batch, record a
// verification result, checkpoint a version, persist, and knit the export.
fn checksum_edit_loop(folder: &DeckFolder, document: &str) -> u64 {
    let mut session = fixtures::session(fixtures::Case::Small);

    let mut deck = parse_deck(document);
    deck.set_rev(session.deck().rev() + 1);
    session.set_deck(deck);

    let base_rev = session.deck().rev();
    let result = apply_ops(session.deck_mut(), base_rev, &edit_ops()).expect("apply_ops");

    let hash = ContentHash::of_content(session.deck().slides()[1].html());
    session.verification_mut().record(
        hash,
        VerificationRecord::new(serde_json::json!({ "verdict": "pass" })),
    );

    session.create_version("edit loop", None, None);
    folder.save_session(&session).expect("save");

    let exported = knit_deck(session.deck());
    fixtures::checksum_str(&exported)
        .wrapping_add(result.delta.canvas_renames.len() as u64)
        .wrapping_add(fixtures::checksum_session(&session))
}

// Benchmark identity (keep stable):
// - Group name in this file: `scenario.edit_loop`
// - Case IDs (the string after the `/`) must remain stable across refactors so
//   results stay comparable over time (e.g. `small`, `medium`, `large_long_text`).
// - If implementations move/deduplicate, update the wiring but do not rename
//   group or case IDs.
fn benches_scenario(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenario.edit_loop");

    for case in [
        fixtures::Case::Small,
        fixtures::Case::Medium,
        fixtures::Case::LargeLongText,
    ] {
        let document = knit_deck(&fixtures::deck(case));
        group.bench_function(case.id(), move |b| {
            b.iter_batched(
                || {
                    let tmp = TempDir::new("scenario");
                    let folder = DeckFolder::new(tmp.path().join("deck"));
                    (tmp, folder)
                },
                |(tmp, folder)| {
                    let acc = checksum_edit_loop(black_box(&folder), black_box(&document));
                    drop(tmp);
                    black_box(acc)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_scenario
}
criterion_main!(benches);
