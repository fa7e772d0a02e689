//! Terminal output of a session
//!
//! Line-oriented and meant for a human. The current target label is written
//! without a newline so the verdict lands on the same line once the player
//! presses something.

use std::io::{self, Write};

use crossterm::style::Stylize;

use crate::game::{Challenge, ScoreState};

// Labels are padded to this width before the verdict
const LABEL_COLUMN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Ok,
    Ko,
}

pub fn banner<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "XInput!")
}

pub fn connection_status<W: Write>(out: &mut W, connected: bool) -> io::Result<()> {
    if connected {
        writeln!(out, "{}", "Connected".green().bold())
    } else {
        writeln!(out, "{}", "Disconnected".red().bold())
    }
}

pub fn prompt<W: Write>(out: &mut W, challenge: Challenge) -> io::Result<()> {
    write!(out, "{}", challenge.label())?;
    out.flush()
}

pub fn verdict<W: Write>(out: &mut W, challenge: Challenge, verdict: Verdict) -> io::Result<()> {
    let padding = " ".repeat(LABEL_COLUMN.saturating_sub(challenge.label().len()));
    match verdict {
        Verdict::Ok => writeln!(out, "{}{}", padding, "OK".green().bold()),
        Verdict::Ko => writeln!(out, "{}{}", padding, "KO".red().bold()),
    }
}

pub fn end_of_session<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)
}

pub fn tally<W: Write>(out: &mut W, score: &ScoreState) -> io::Result<()> {
    writeln!(out, "Errors: {}/{}", score.misses, score.hits)?;
    out.flush()
}

/// Drops ANSI color sequences so tests can compare plain text
#[cfg(test)]
pub fn strip_ansi(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let mut plain = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            plain.push(c);
        }
    }
    plain
}
