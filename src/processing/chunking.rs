//! Recursive separator-based text splitting.
//!
//! The splitter walks a prioritized list of separators (for documents: paragraph break, line
//! break, space). The first separator present in the text cuts it into pieces; each separator
//! stays attached to the start of the piece that follows it. Short pieces are merged greedily into
//! chunks of at most `chunk_size` characters, and the trailing pieces of one chunk (up to
//! `overlap` characters) are repeated at the start of the next. Pieces that are still too long are
//! split again with the lower-priority separators, and once none remain they are cut into
//! fixed-size windows that overlap the same way.
//!
//! Lengths are counted in `char`s, never bytes.

use std::collections::VecDeque;

use super::types::ChunkingError;

/// Split `text` into ordered chunks of at most `max_size` characters.
///
/// Returns an empty vector when the input is empty or whitespace.
pub fn split(
    text: &str,
    max_size: usize,
    overlap: usize,
    separators: &[&str],
) -> Result<Vec<String>, ChunkingError> {
    if max_size == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }
    if overlap >= max_size {
        return Err(ChunkingError::InvalidOverlap {
            chunk_size: max_size,
            overlap,
        });
    }
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let splitter = RecursiveSplitter {
        chunk_size: max_size,
        overlap,
    };
    let mut chunks = Vec::new();
    splitter.split_into(text, separators, &mut chunks);
    Ok(chunks)
}

/// Replace line breaks with spaces so each chunk reads as a single line.
pub fn normalize_newlines(chunk: &str) -> String {
    chunk.replace('\n', " ")
}

struct RecursiveSplitter {
    chunk_size: usize,
    overlap: usize,
}

impl RecursiveSplitter {
    fn split_into(&self, text: &str, separators: &[&str], out: &mut Vec<String>) {
        let (separator, remaining) = pick_separator(text, separators);
        let mut pending: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }

            if !pending.is_empty() {
                self.merge(&pending, out);
                pending.clear();
            }
            if remaining.is_empty() {
                hard_cut(piece, self.chunk_size, self.overlap, out);
            } else {
                self.split_into(piece, remaining, out);
            }
        }

        if !pending.is_empty() {
            self.merge(&pending, out);
        }
    }

    /// Greedily pack pieces into chunks, carrying up to `overlap` characters forward.
    fn merge(&self, pieces: &[&str], out: &mut Vec<String>) {
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !window.is_empty() {
                push_joined(&window, out);
                while total > self.overlap || (total + len > self.chunk_size && total > 0) {
                    let Some(dropped) = window.pop_front() else {
                        break;
                    };
                    total -= char_len(dropped);
                }
            }
            window.push_back(piece);
            total += len;
        }

        push_joined(&window, out);
    }
}

fn pick_separator<'s>(text: &str, separators: &'s [&'s str]) -> (&'s str, &'s [&'s str]) {
    for (index, separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return ("", &[]);
        }
        if text.contains(separator) {
            return (separator, &separators[index + 1..]);
        }
    }
    (separators.last().copied().unwrap_or(""), &[])
}

fn split_keeping_separator<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(index, c)| &text[index..index + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (index, _) in text.match_indices(separator) {
        if index > start {
            pieces.push(&text[start..index]);
        }
        start = index;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

/// Cut into windows of `chunk_size` characters, each starting `overlap` characters before the
/// end of the previous one.
fn hard_cut(piece: &str, chunk_size: usize, overlap: usize, out: &mut Vec<String>) {
    let chars: Vec<char> = piece.chars().collect();
    let step = chunk_size - overlap;
    let mut start = 0;
    loop {
        let end = (start + chunk_size).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            out.push(trimmed.to_string());
        }
        if end == chars.len() {
            break;
        }
        start += step;
    }
}

fn push_joined(window: &VecDeque<&str>, out: &mut Vec<String>) {
    let joined: String = window.iter().copied().collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
