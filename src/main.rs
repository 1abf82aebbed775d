// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Proteus maintenance CLI.
//!
//! Operates on one session folder at a time: inspect the deck, import a full
//! HTML document, knit the deck (or a single slide) to stdout, and manage the
//! bounded version history.

use std::error::Error;

use proteus::format::html::{knit_deck, knit_slide, parse_deck};
use proteus::model::SessionId;
use proteus::store::{DeckFolder, SessionStore, WriteDurability};
use proteus::verify::SlideVerification;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} <deck-dir> [--durable-writes] show\n  {program} <deck-dir> [--durable-writes] import <file.html>\n  {program} <deck-dir> [--durable-writes] knit [slide-index]\n  {program} <deck-dir> [--durable-writes] versions\n  {program} <deck-dir> [--durable-writes] save-point <description>\n  {program} <deck-dir> [--durable-writes] restore <n>\n\nshow        prints the deck summary and per-slide verification status.\nimport      replaces the deck with the parsed contents of an HTML document.\nknit        prints the full document, or a single slide's fragment.\nversions    lists stored versions, newest first.\nsave-point  stores a version of the current state.\nrestore     restores version <n>, dropping later versions and chat.\n\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported)."
    );
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Show,
    Import { file: String },
    Knit { slide_index: Option<usize> },
    Versions,
    SavePoint { description: String },
    Restore { number: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    deck_dir: String,
    durable_writes: bool,
    command: Command,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut deck_dir = None;
    let mut durable_writes = false;

    let command = loop {
        let arg = args.next().ok_or(())?;
        match arg.as_str() {
            "--durable-writes" => {
                if durable_writes {
                    return Err(());
                }
                durable_writes = true;
            }
            "show" => break Command::Show,
            "import" => {
                let file = args.next().ok_or(())?;
                break Command::Import { file };
            }
            "knit" => {
                let slide_index = match args.next() {
                    Some(raw) => Some(raw.parse().map_err(|_| ())?),
                    None => None,
                };
                break Command::Knit { slide_index };
            }
            "versions" => break Command::Versions,
            "save-point" => {
                let description = args.next().ok_or(())?;
                break Command::SavePoint { description };
            }
            "restore" => {
                let raw = args.next().ok_or(())?;
                let number: u64 = raw.parse().map_err(|_| ())?;
                break Command::Restore { number };
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if deck_dir.is_some() {
                    return Err(());
                }
                deck_dir = Some(arg);
            }
        }
    };

    if args.next().is_some() {
        return Err(());
    }

    Ok(CliOptions {
        deck_dir: deck_dir.ok_or(())?,
        durable_writes,
        command,
    })
}

fn session_id_for_dir(dir: &str) -> Result<SessionId, Box<dyn Error>> {
    let name = std::path::Path::new(dir)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("deck");
    Ok(SessionId::new(name).or_else(|_| SessionId::new("deck"))?)
}

fn run(options: CliOptions) -> Result<(), Box<dyn Error>> {
    let folder = if options.durable_writes {
        DeckFolder::new(&options.deck_dir).with_durability(WriteDurability::Durable)
    } else {
        DeckFolder::new(&options.deck_dir)
    };
    let mut session = folder.load_or_init_session(session_id_for_dir(&options.deck_dir)?)?;

    match options.command {
        Command::Show => {
            let deck = session.deck();
            println!("title: {}", deck.title());
            println!("rev: {}", deck.rev());
            println!("slides: {}", deck.slide_count());
            for (index, (slide, status)) in deck
                .slides()
                .iter()
                .zip(session.slide_verification())
                .enumerate()
            {
                let status = match status {
                    SlideVerification::Verified(_) => "verified",
                    SlideVerification::Unverified => "unverified",
                };
                println!("  [{index}] {} — {status}", slide.slide_id());
            }
        }
        Command::Import { file } => {
            let html = std::fs::read_to_string(&file)?;
            let mut deck = parse_deck(&html);
            deck.set_rev(session.deck().rev());
            deck.bump_rev();
            session.set_deck(deck);
            folder.save_session(&session)?;
            println!(
                "imported {} slide(s) from {file}",
                session.deck().slide_count()
            );
        }
        Command::Knit { slide_index } => match slide_index {
            Some(index) => print!("{}", knit_slide(session.deck(), index)?),
            None => print!("{}", knit_deck(session.deck())),
        },
        Command::Versions => {
            for meta in session.versions().list_versions() {
                let by = meta.created_by.as_deref().unwrap_or("-");
                println!(
                    "v{} {} ({} slide(s), {}, by {by})",
                    meta.number, meta.description, meta.slide_count, meta.created_at_ms
                );
            }
        }
        Command::SavePoint { description } => {
            let outcome = session.create_version(description, None, None);
            folder.save_session(&session)?;
            match outcome.evicted {
                Some(evicted) => println!("stored v{} (evicted v{evicted})", outcome.number),
                None => println!("stored v{}", outcome.number),
            }
        }
        Command::Restore { number } => {
            let outcome = session.restore_version(number)?;
            folder.save_session(&session)?;
            println!(
                "restored v{number} (dropped {} version(s), {} message(s))",
                outcome.deleted_versions.len(),
                outcome.deleted_messages
            );
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "proteus".to_owned());

    let options = match parse_options(args) {
        Ok(options) => options,
        Err(()) => {
            print_usage(&program);
            std::process::exit(2);
        }
    };

    if let Err(err) = run(options) {
        eprintln!("proteus: {err}");
        std::process::exit(1);
    }
}
