// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! User text: display transforms and line wrapping.

use crate::surface::{Font, TextMeasure};
use thiserror::Error;
use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Why a transform could not render some text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("unclosed link starting at byte {0}")]
    UnclosedLink(usize),
    #[error("unclosed emphasis starting at byte {0}")]
    UnclosedEmphasis(usize),
}

/// How event descriptions are turned into display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TextFormat {
    /// Shown as written.
    #[default]
    Plain,
    /// `**emphasis**` markers are removed and `[label](url)` becomes
    /// `label <url>`.
    Markup,
}

impl TextFormat {
    pub fn transform(&self, text: &str) -> Result<String, TextError> {
        match self {
            TextFormat::Plain => Ok(text.to_owned()),
            TextFormat::Markup => render_markup(text),
        }
    }

    /// Like [`transform`](Self::transform) but never fails: text the
    /// transform rejects is shown escaped instead.
    pub fn render(&self, text: &str) -> String {
        self.transform(text).unwrap_or_else(|err| {
            warn!(%err, format = ?self, "text transform failed, showing escaped text");
            escape(text)
        })
    }
}

/// Control characters other than newline and tab become visible escapes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_control() && c != '\n' && c != '\t' {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    out
}

fn render_markup(text: &str) -> Result<String, TextError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut offset = 0;
    let mut emphasis_open: Option<usize> = None;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("**") {
            emphasis_open = match emphasis_open {
                Some(_) => None,
                None => Some(offset),
            };
            offset += 2;
            rest = after;
        } else if rest.starts_with('[') {
            let close = rest.find("](").ok_or(TextError::UnclosedLink(offset))?;
            let url_end = rest[close + 2..]
                .find(')')
                .ok_or(TextError::UnclosedLink(offset))?;
            let label = &rest[1..close];
            let url = &rest[close + 2..close + 2 + url_end];
            out.push_str(label);
            out.push_str(" <");
            out.push_str(url);
            out.push('>');
            let used = close + 2 + url_end + 1;
            offset += used;
            rest = &rest[used..];
        } else {
            let Some(c) = rest.chars().next() else {
                break;
            };
            out.push(c);
            offset += c.len_utf8();
            rest = &rest[c.len_utf8()..];
        }
    }
    match emphasis_open {
        Some(at) => Err(TextError::UnclosedEmphasis(at)),
        None => Ok(out),
    }
}

/// Greedy word wrap to `max_width` pixels.  Paragraph breaks are kept and
/// words wider than a line are broken with [`break_word`].
pub fn wrap_text(text: &str, max_width: i32, font: &Font, measure: &dyn TextMeasure) -> Vec<String> {
    let width = |s: &str| measure.text_extent(s, font).0;
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_owned()
            } else {
                format!("{line} {word}")
            };
            if width(&candidate) <= max_width {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if width(word) <= max_width {
                line = word.to_owned();
            } else {
                let mut pieces = break_word(word, max_width, font, measure);
                line = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }
        lines.push(line);
    }
    lines
}

/// Split a word too wide for `max_width` into hyphenated pieces.  Every
/// piece but the last ends with `-`; each holds at least one character.
///
/// A word that already ends in a hyphen gets no special treatment.
pub fn break_word(word: &str, max_width: i32, font: &Font, measure: &dyn TextMeasure) -> Vec<String> {
    let width = |s: &str| measure.text_extent(s, font).0;
    let mut pieces = Vec::new();
    let mut rest: &str = word;
    while width(rest) > max_width {
        let mut cut = 0;
        for (i, c) in rest.char_indices() {
            let end = i + c.len_utf8();
            if width(&format!("{}-", &rest[..end])) > max_width {
                break;
            }
            cut = end;
        }
        if cut == 0 {
            // Not even one character and a hyphen fit; take one anyway.
            cut = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        if cut >= rest.len() {
            break;
        }
        pieces.push(format!("{}-", &rest[..cut]));
        rest = &rest[cut..];
    }
    pieces.push(rest.to_owned());
    pieces
}
