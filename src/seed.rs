//! Bundled sample collection
//!
//! Written to storage on first run so the application never starts empty.
//! Ids and timestamps are stable so reseeding is deterministic.

use crate::models::Note;
use chrono::{DateTime, Utc};

fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

fn note(id: &str, title: &str, body: &str, created: i64, archived: bool) -> Note {
    Note {
        id: id.to_string(),
        title: title.to_string(),
        body: body.to_string(),
        created_at: ts(created),
        archived,
        pinned: false,
    }
}

/// The first-run sample notes, newest first
pub fn sample_notes() -> Vec<Note> {
    vec![
        note(
            "notes-1",
            "Welcome to Pinnote",
            "Create, pin, archive, and search notes. Pinned notes always sort to the top.",
            1_650_012_000,
            false,
        ),
        note(
            "notes-2",
            "Shopping list",
            "Milk, eggs, coffee beans, and something green for the balcony.",
            1_649_925_600,
            false,
        ),
        note(
            "notes-3",
            "Reading queue",
            "Finish the chapter on ownership, then the one on error handling.",
            1_649_839_200,
            false,
        ),
        note(
            "notes-4",
            "Meeting follow-up",
            "Send the revised estimate and schedule the retro for Thursday.",
            1_649_752_800,
            false,
        ),
        note(
            "notes-5",
            "Old project ideas",
            "A habit tracker, a recipe box, a tiny wiki. Parked for now.",
            1_649_666_400,
            true,
        ),
        note(
            "notes-6",
            "2021 retrospective",
            "Kept for reference. Ship smaller, talk to users earlier.",
            1_649_580_000,
            true,
        ),
    ]
}
