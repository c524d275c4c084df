//! Character-window splitter.
//!
//! Text is split on blank lines (`"\n\n"`), empty pieces are dropped, and the
//! pieces are merged greedily into chunks of at most `chunk_size` characters
//! (pieces joined by `"\n\n"`). When a chunk is closed, trailing pieces totalling
//! at most `overlap` characters are carried into the next one.
//!
//! A single piece longer than `chunk_size` is first cut into fixed windows of
//! `chunk_size` characters advancing by `chunk_size - overlap`.
//!
//! Lengths are counted in `char`s, never bytes.

use std::collections::VecDeque;

const SEPARATOR: &str = "\n\n";
const SEPARATOR_LEN: usize = 2;

/// Splits `text` into overlapping chunks. Requires `overlap < chunk_size`.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chunk_size = chunk_size.max(1);
    let overlap = overlap.min(chunk_size - 1);

    let mut pieces = Vec::new();
    for piece in text.split(SEPARATOR).map(str::trim).filter(|p| !p.is_empty()) {
        if char_len(piece) > chunk_size {
            pieces.extend(fixed_windows(piece, chunk_size, overlap));
        } else {
            pieces.push(piece.to_string());
        }
    }
    merge(pieces, chunk_size, overlap)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn fixed_windows(piece: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = piece.chars().collect();
    let step = size - overlap;
    let mut out = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + size).min(chars.len());
        out.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    out
}

fn merge(pieces: Vec<String>, chunk_size: usize, overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: VecDeque<(String, usize)> = VecDeque::new();
    let mut total = 0usize;

    for piece in pieces {
        let len = char_len(&piece);
        let sep = if current.is_empty() { 0 } else { SEPARATOR_LEN };

        if total + len + sep > chunk_size && !current.is_empty() {
            chunks.push(join(&current));

            // Drop from the front until what is left fits the overlap budget
            // and leaves room for the incoming piece.
            while total > overlap
                || (total > 0
                    && total + len + if current.is_empty() { 0 } else { SEPARATOR_LEN }
                        > chunk_size)
            {
                let Some((_, first_len)) = current.pop_front() else {
                    break;
                };
                total -= first_len + if current.is_empty() { 0 } else { SEPARATOR_LEN };
            }
        }

        total += len + if current.is_empty() { 0 } else { SEPARATOR_LEN };
        current.push_back((piece, len));
    }

    if !current.is_empty() {
        chunks.push(join(&current));
    }
    chunks
}

fn join(pieces: &VecDeque<(String, usize)>) -> String {
    pieces
        .iter()
        .map(|(p, _)| p.as_str())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_text("The sky is blue.", 1000, 200), vec!["The sky is blue."]);
    }

    #[test]
    fn blank_input_yields_nothing() {
        assert!(split_text(" \n\n \n\n", 1000, 200).is_empty());
    }

    #[test]
    fn paragraphs_merge_up_to_window_and_carry_overlap() {
        // Three 8-char paragraphs, window 20, overlap 10.
        let text = "aaaaaaaa\n\nbbbbbbbb\n\ncccccccc";
        let chunks = split_text(text, 20, 10);
        assert_eq!(
            chunks,
            vec!["aaaaaaaa\n\nbbbbbbbb", "bbbbbbbb\n\ncccccccc"]
        );
        assert!(chunks.iter().all(|c| c.chars().count() <= 20));
    }

    #[test]
    fn oversized_paragraph_is_windowed_with_overlap() {
        let text: String = ('a'..='z').cycle().take(2500).collect();
        let chunks = split_text(&text, 1000, 200);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 1000));
        // consecutive windows share exactly `overlap` characters
        let tail: String = chunks[0].chars().skip(800).collect();
        let head: String = chunks[1].chars().take(200).collect();
        assert_eq!(tail, head);
    }

    #[test]
    fn counts_chars_not_bytes() {
        let text = "é".repeat(30);
        let chunks = split_text(&text, 10, 2);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
    }
}
