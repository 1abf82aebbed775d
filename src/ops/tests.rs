// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::format::html::knit_deck;
use crate::format::html::scan::duplicate_element_ids;
use crate::model::{slide_label, Slide, SlideDeck};

use super::{apply_ops, AddPosition, ApplyError, DeckOp, NewSlide};

fn deck_with_slides(count: usize) -> SlideDeck {
    let mut deck = SlideDeck::new("Demo");
    for index in 0..count {
        deck.slides_mut().push(Slide::new(
            slide_label(index),
            format!("<div class=\"slide\"><canvas id=\"chart{index}\"></canvas></div>"),
            format!("new Chart(document.getElementById('chart{index}'), {{}});"),
        ));
    }
    deck
}

fn chart_slide(canvas_id: &str) -> NewSlide {
    NewSlide::new(
        format!("<div class=\"slide\"><canvas id=\"{canvas_id}\"></canvas></div>"),
        format!("new Chart(document.getElementById('{canvas_id}'), {{}});"),
    )
}

#[test]
fn replace_bumps_rev_and_keeps_the_arithmetic() {
    let mut deck = deck_with_slides(15);
    let ops = [DeckOp::ReplaceRange {
        start: 2,
        count: 1,
        slides: vec![chart_slide("chartX")],
    }];

    let result = apply_ops(&mut deck, 0, &ops).expect("apply");
    assert_eq!(result.new_rev, 1);
    assert_eq!(deck.rev(), 1);
    assert_eq!(deck.slide_count(), 15);
    assert!(deck.slides()[2].html().contains("chartX"));
    assert_eq!(result.delta.added.len(), 1);
    assert_eq!(result.delta.removed.len(), 1);

    let html = knit_deck(&deck);
    assert_eq!(html.matches("getElementById('chartX')").count(), 1);
}

#[test]
fn condensing_replace_shrinks_the_deck() {
    let mut deck = deck_with_slides(15);
    let ops = [DeckOp::ReplaceRange {
        start: 12,
        count: 3,
        slides: vec![NewSlide::new("<div class=\"slide\"><p>Summary</p></div>", "")],
    }];

    apply_ops(&mut deck, 0, &ops).expect("apply");
    assert_eq!(deck.slide_count(), 13);
    assert_eq!(deck.slides()[12].scripts(), "");
}

#[test]
fn stale_base_rev_is_a_conflict() {
    let mut deck = deck_with_slides(3);
    deck.set_rev(5);

    let result = apply_ops(&mut deck, 4, &[DeckOp::SetTitle { title: "X".to_owned() }]);
    assert_eq!(
        result,
        Err(ApplyError::Conflict {
            base_rev: 4,
            current_rev: 5
        })
    );
    assert_eq!(deck.title(), "Demo");
}

#[test]
fn empty_op_batch_leaves_rev_untouched() {
    let mut deck = deck_with_slides(2);
    let result = apply_ops(&mut deck, 0, &[]).expect("apply");
    assert_eq!(result.new_rev, 0);
    assert_eq!(result.applied, 0);
    assert_eq!(deck.rev(), 0);
}

#[test]
fn out_of_range_replace_clamps_instead_of_failing() {
    let mut deck = deck_with_slides(3);
    let ops = [DeckOp::ReplaceRange {
        start: 10,
        count: 5,
        slides: vec![chart_slide("tail")],
    }];

    apply_ops(&mut deck, 0, &ops).expect("apply");
    assert_eq!(deck.slide_count(), 4);
    assert!(deck.slides()[3].html().contains("tail"));
}

#[test]
fn insert_defaults_to_after_the_selection() {
    let mut deck = deck_with_slides(4);
    let ops = [DeckOp::InsertSlides {
        position: AddPosition::default(),
        anchor: vec![1],
        slides: vec![chart_slide("inserted")],
    }];

    apply_ops(&mut deck, 0, &ops).expect("apply");
    assert_eq!(deck.slide_count(), 5);
    assert!(deck.slides()[2].html().contains("inserted"));
}

#[test]
fn insert_before_beginning_and_end_resolve_positions() {
    let mut deck = deck_with_slides(3);
    let ops = [
        DeckOp::InsertSlides {
            position: AddPosition::Before,
            anchor: vec![1, 2],
            slides: vec![chart_slide("before")],
        },
        DeckOp::InsertSlides {
            position: AddPosition::Beginning,
            anchor: vec![],
            slides: vec![chart_slide("first")],
        },
        DeckOp::InsertSlides {
            position: AddPosition::End,
            anchor: vec![],
            slides: vec![chart_slide("last")],
        },
    ];

    apply_ops(&mut deck, 0, &ops).expect("apply");
    assert_eq!(deck.slide_count(), 6);
    assert!(deck.slides()[0].html().contains("first"));
    assert!(deck.slides()[2].html().contains("before"));
    assert!(deck.slides()[5].html().contains("last"));
}

#[test]
fn divergent_selection_fails_closed_to_position_zero() {
    let mut deck = deck_with_slides(2);
    let ops = [DeckOp::InsertSlides {
        position: AddPosition::After,
        anchor: vec![7],
        slides: vec![chart_slide("recovered")],
    }];

    apply_ops(&mut deck, 0, &ops).expect("apply");
    assert_eq!(deck.slide_count(), 3);
    assert!(deck.slides()[0].html().contains("recovered"));
}

#[test]
fn colliding_canvas_id_is_renamed_in_the_new_slide_only() {
    let mut deck = deck_with_slides(2);
    let ops = [DeckOp::InsertSlides {
        position: AddPosition::End,
        anchor: vec![],
        slides: vec![chart_slide("chart0")],
    }];

    let result = apply_ops(&mut deck, 0, &ops).expect("apply");
    assert_eq!(
        result.delta.canvas_renames,
        [("chart0".to_owned(), "chart0-2".to_owned())]
    );

    // The pre-existing slide keeps its id; only the new slide was rewritten.
    assert!(deck.slides()[0].html().contains("id=\"chart0\""));
    assert!(deck.slides()[2].html().contains("id=\"chart0-2\""));
    assert!(deck.slides()[2]
        .scripts()
        .contains("getElementById('chart0-2')"));
    assert!(duplicate_element_ids(&knit_deck(&deck)).is_empty());
}

#[test]
fn rename_skips_suffixes_that_are_also_taken() {
    let mut deck = deck_with_slides(1);
    let ops = [DeckOp::InsertSlides {
        position: AddPosition::End,
        anchor: vec![],
        slides: vec![chart_slide("chart0-2"), chart_slide("chart0")],
    }];

    apply_ops(&mut deck, 0, &ops).expect("apply");
    assert!(deck.slides()[1].html().contains("id=\"chart0-2\""));
    assert!(deck.slides()[2].html().contains("id=\"chart0-3\""));
    assert!(duplicate_element_ids(&knit_deck(&deck)).is_empty());
}

#[test]
fn repeated_id_within_one_new_slide_gets_distinct_names() {
    let mut deck = deck_with_slides(1);
    let ops = [DeckOp::InsertSlides {
        position: AddPosition::End,
        anchor: vec![],
        slides: vec![NewSlide::new(
            "<div class=\"slide\"><canvas id=\"dup\"></canvas><canvas id=\"dup\"></canvas></div>",
            "new Chart(document.getElementById('dup'), {});",
        )],
    }];

    let result = apply_ops(&mut deck, 0, &ops).expect("apply");
    // The second occurrence collides with the first and is renamed on its own.
    assert_eq!(
        result.delta.canvas_renames,
        [("dup".to_owned(), "dup-2".to_owned())]
    );

    let html = deck.slides()[1].html();
    assert!(html.contains("id=\"dup\""));
    assert!(html.contains("id=\"dup-2\""));
    // The script still targets the first occurrence, which kept its id.
    assert!(deck.slides()[1].scripts().contains("getElementById('dup')"));
    assert!(duplicate_element_ids(&knit_deck(&deck)).is_empty());
}

#[test]
fn unquoted_id_attributes_are_renamed_too() {
    let mut deck = deck_with_slides(1);
    let ops = [DeckOp::InsertSlides {
        position: AddPosition::End,
        anchor: vec![],
        slides: vec![NewSlide::new(
            "<div class=\"slide\"><canvas id=chart0 width=400></canvas></div>",
            "new Chart(document.getElementById('chart0'), {});",
        )],
    }];

    let result = apply_ops(&mut deck, 0, &ops).expect("apply");
    assert_eq!(
        result.delta.canvas_renames,
        [("chart0".to_owned(), "chart0-2".to_owned())]
    );
    assert!(deck.slides()[1].html().contains("id=chart0-2 width=400"));
    assert!(deck.slides()[1]
        .scripts()
        .contains("getElementById('chart0-2')"));
    assert!(duplicate_element_ids(&knit_deck(&deck)).is_empty());
}

#[test]
fn no_duplicate_canvas_ids_after_a_mixed_batch() {
    let mut deck = deck_with_slides(5);
    let ops = [
        DeckOp::ReplaceRange {
            start: 1,
            count: 2,
            slides: vec![chart_slide("chart4"), chart_slide("fresh")],
        },
        DeckOp::RemoveRange { start: 0, count: 1 },
        DeckOp::InsertSlides {
            position: AddPosition::End,
            anchor: vec![],
            slides: vec![chart_slide("fresh")],
        },
    ];

    apply_ops(&mut deck, 0, &ops).expect("apply");
    assert!(duplicate_element_ids(&knit_deck(&deck)).is_empty());
}

#[test]
fn remove_range_records_removed_slide_ids() {
    let mut deck = deck_with_slides(4);
    let removed_ids = [
        deck.slides()[1].slide_id().clone(),
        deck.slides()[2].slide_id().clone(),
    ];

    let result = apply_ops(&mut deck, 0, &[DeckOp::RemoveRange { start: 1, count: 2 }])
        .expect("apply");
    assert_eq!(deck.slide_count(), 2);
    assert_eq!(result.delta.removed, removed_ids);
}

#[test]
fn reorder_requires_an_exact_permutation() {
    let mut deck = deck_with_slides(3);

    let result = apply_ops(&mut deck, 0, &[DeckOp::Reorder { order: vec![0, 0, 2] }]);
    assert_eq!(
        result,
        Err(ApplyError::InvalidPermutation {
            expected_len: 3,
            order: vec![0, 0, 2]
        })
    );

    apply_ops(&mut deck, 0, &[DeckOp::Reorder { order: vec![2, 0, 1] }]).expect("apply");
    assert!(deck.slides()[0].html().contains("chart2"));
    assert!(deck.slides()[1].html().contains("chart0"));
    assert!(deck.slides()[2].html().contains("chart1"));
}

#[test]
fn failed_batch_never_corrupts_the_deck() {
    let mut deck = deck_with_slides(3);
    let before = deck.clone();
    let ops = [
        DeckOp::RemoveRange { start: 0, count: 1 },
        DeckOp::Reorder { order: vec![5, 6] },
    ];

    let result = apply_ops(&mut deck, 0, &ops);
    assert!(matches!(result, Err(ApplyError::InvalidPermutation { .. })));
    assert_eq!(deck, before);
}

#[test]
fn slide_labels_are_never_reused_across_a_batch() {
    let mut deck = deck_with_slides(3);
    let ops = [
        DeckOp::RemoveRange { start: 2, count: 1 },
        DeckOp::InsertSlides {
            position: AddPosition::End,
            anchor: vec![],
            slides: vec![chart_slide("a"), chart_slide("b")],
        },
    ];

    apply_ops(&mut deck, 0, &ops).expect("apply");
    assert_eq!(deck.slides()[2].slide_id().as_str(), "slide-3");
    assert_eq!(deck.slides()[3].slide_id().as_str(), "slide-4");
}

#[test]
fn set_title_and_merge_css_are_deck_level_edits() {
    let mut deck = deck_with_slides(1);
    deck.set_css(".slide { color: red; }");
    let ops = [
        DeckOp::SetTitle {
            title: "Renamed".to_owned(),
        },
        DeckOp::MergeCss {
            replacement: ".slide { color: blue; }".to_owned(),
        },
    ];

    let result = apply_ops(&mut deck, 0, &ops).expect("apply");
    assert_eq!(deck.title(), "Renamed");
    assert!(deck.css().contains("color: blue;"));
    assert!(!deck.css().contains("color: red;"));
    assert!(result.delta.added.is_empty());
}

#[test]
fn slide_added_then_removed_in_one_batch_is_absent_from_the_delta() {
    let mut deck = deck_with_slides(1);
    let ops = [
        DeckOp::InsertSlides {
            position: AddPosition::End,
            anchor: vec![],
            slides: vec![chart_slide("ephemeral")],
        },
        DeckOp::RemoveRange { start: 1, count: 1 },
    ];

    let result = apply_ops(&mut deck, 0, &ops).expect("apply");
    assert_eq!(deck.slide_count(), 1);
    assert!(result.delta.added.is_empty());
    assert!(result.delta.removed.is_empty());
}
