//! # Block Extraction
//!
//! Locates an ABC notation block inside free-form wikitext and strips metadata fields
//! that are noise in a preview.
//!
//! ## Block Rules
//! 1. The block starts at the first line beginning with `X:` (reference number)
//! 2. It continues to the first `K:` line (key signature) at or after the start
//! 3. After `K:`, blank lines and other header fields (`T:`, `M:`, `N:`, ...) are skipped
//! 4. The first remaining line is the music line, and it ends the block
//!
//! Only the first `X:` is ever considered. A malformed first tune is not recovered from a
//! later one.
//!
//! ## Example
//! ```rust
//! use abc_hover::extract_block;
//!
//! let content = "Some prose.\nX:1\nT:Song\nK:C\nN:note\nCDEFGA|\nmore prose";
//! let block = extract_block(Some(content)).unwrap();
//! assert_eq!(block.as_str(), "X:1\nT:Song\nK:C\nN:note\nCDEFGA|");
//! assert_eq!(block.clean().as_str(), "X:1\nT:Song\nK:C\nCDEFGA|");
//! ```

use std::fmt;

use crate::error::{HoverError, MissingPiece};

/// Header fields removed before rendering: book, discography, file, history, notes, source.
const DROPPED_FIELDS: &[u8] = b"BDFHNS";

/// An ABC block cut from article text, from the `X:` line through the first music line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotationBlock {
    text: String,
}

/// A [`NotationBlock`] with metadata fields removed, ready for the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedBlock {
    text: String,
}

impl NotationBlock {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    /// The music line that terminated the block.
    pub fn content_line(&self) -> &str {
        self.text.rsplit('\n').next().unwrap_or_default()
    }

    pub fn clean(&self) -> CleanedBlock {
        CleanedBlock {
            text: strip_fields(&self.text),
        }
    }
}

impl CleanedBlock {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Clean again. Always equal to `self`.
    pub fn clean(&self) -> CleanedBlock {
        CleanedBlock {
            text: strip_fields(&self.text),
        }
    }
}

impl fmt::Display for NotationBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Display for CleanedBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Split on `\r\n`, `\n` or a lone `\r`.
fn split_lines(content: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let bytes = content.as_bytes();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&content[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&content[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    lines.push(&content[start..]);
    lines
}

/// `^<letter>:` on the untrimmed line.
fn is_field(line: &str, letter: u8) -> bool {
    let bytes = line.as_bytes();
    bytes.len() >= 2 && bytes[0] == letter && bytes[1] == b':'
}

/// `^[A-Z]:`
fn is_header(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_uppercase() && bytes[1] == b':'
}

fn is_dropped_field(line: &str) -> bool {
    let bytes = line.trim().as_bytes();
    bytes.len() >= 2
        && DROPPED_FIELDS.contains(&bytes[0].to_ascii_uppercase())
        && bytes[1] == b':'
}

fn strip_fields(text: &str) -> String {
    split_lines(text)
        .into_iter()
        .filter(|line| !is_dropped_field(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Find the notation block, reporting which piece is missing on failure.
pub fn find_block(content: &str) -> Result<NotationBlock, HoverError> {
    let lines = split_lines(content);

    let start = lines
        .iter()
        .position(|line| is_field(line, b'X'))
        .ok_or(HoverError::NotFound(MissingPiece::StartMarker))?;

    let key = start
        + lines[start..]
            .iter()
            .position(|line| is_field(line, b'K'))
            .ok_or(HoverError::NotFound(MissingPiece::KeyMarker))?;

    let music = key
        + 1
        + lines[key + 1..]
            .iter()
            .position(|line| {
                let trimmed = line.trim();
                !trimmed.is_empty() && !is_header(trimmed)
            })
            .ok_or(HoverError::NotFound(MissingPiece::ContentLine))?;

    Ok(NotationBlock {
        text: lines[start..=music].join("\n"),
    })
}

/// Extract the notation block from article content, if any.
///
/// Absent content and content without a complete block both give `None`.
pub fn extract_block(content: Option<&str>) -> Option<NotationBlock> {
    find_block(content?).ok()
}

/// Remove `B:`, `D:`, `F:`, `H:`, `N:` and `S:` lines. `None` passes through.
pub fn clean_block(block: Option<&NotationBlock>) -> Option<CleanedBlock> {
    block.map(NotationBlock::clean)
}
