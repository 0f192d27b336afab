//! Recursive character text splitter

use billguard_core::{Error, PipelineConfig, Result, TextSplitter};

/// Splits text on the coarsest separator that occurs, recursing into pieces
/// that are still too long, then merges pieces back into windows of at most
/// `chunk_size` characters with up to `chunk_overlap` characters carried over
/// between consecutive windows.
///
/// Separators are kept at the start of the piece that follows them and each
/// window is trimmed of surrounding whitespace.
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveSplitter {
    pub const DEFAULT_SEPARATORS: [&'static str; 4] = ["\n\n", "\n", " ", ""];

    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Configuration("chunk_size must be greater than 0".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::Configuration(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: Self::DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut fitting: Vec<String> = Vec::new();
        for piece in split_keep_separator(text, separator) {
            if char_len(&piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }
            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting));
                fitting.clear();
            }
            if remaining.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(self.split_recursive(&piece, remaining));
            }
        }
        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting));
        }
        chunks
    }

    fn merge(&self, pieces: &[String]) -> Vec<String> {
        let mut windows = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut head = 0;
        let mut total = 0;

        for piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && current.len() > head {
                push_window(&mut windows, &current[head..]);
                while head < current.len()
                    && (total > self.chunk_overlap || total + len > self.chunk_size)
                {
                    total -= char_len(current[head]);
                    head += 1;
                }
            }
            current.push(piece);
            total += len;
        }
        push_window(&mut windows, &current[head..]);
        windows
    }
}

impl TextSplitter for RecursiveSplitter {
    fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn push_window(windows: &mut Vec<String>, pieces: &[&str]) {
    let joined = pieces.concat();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        windows.push(trimmed.to_string());
    }
}

/// Split on `separator`, attaching each separator to the start of the piece
/// after it. An empty separator splits into characters. Empty pieces are dropped.
fn split_keep_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (index, _) in text.match_indices(separator) {
        if index > start {
            pieces.push(text[start..index].to_string());
        }
        start = index;
    }
    if start < text.len() {
        pieces.push(text[start..].to_string());
    }
    pieces.retain(|piece| !piece.is_empty());
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = RecursiveSplitter::new(1000, 200).unwrap();
        assert_eq!(splitter.split_text("  Total Amount Due: $12.00 \n"), vec!["Total Amount Due: $12.00"]);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        let splitter = RecursiveSplitter::new(1000, 200).unwrap();
        assert!(splitter.split_text("").is_empty());
        assert!(splitter.split_text(" \n\n ").is_empty());
    }

    #[test]
    fn test_overlapping_windows() {
        let splitter = RecursiveSplitter::new(10, 5).unwrap();
        assert_eq!(
            splitter.split_text("aaaa bbbb cccc dddd"),
            vec!["aaaa bbbb", "bbbb cccc", "cccc dddd"]
        );
    }

    #[test]
    fn test_no_overlap_when_pieces_too_big_to_carry() {
        let splitter = RecursiveSplitter::new(10, 4).unwrap();
        assert_eq!(
            splitter.split_text("aaaa bbbb cccc dddd"),
            vec!["aaaa bbbb", "cccc dddd"]
        );
    }

    #[test]
    fn test_long_word_falls_back_to_characters() {
        let splitter = RecursiveSplitter::new(5, 0).unwrap();
        assert_eq!(splitter.split_text("abcdefghijkl"), vec!["abcde", "fghij", "kl"]);
    }

    #[test]
    fn test_paragraphs_preferred() {
        let splitter = RecursiveSplitter::new(20, 0).unwrap();
        let chunks = splitter.split_text("first paragraph\n\nsecond paragraph");
        assert_eq!(chunks, vec!["first paragraph", "second paragraph"]);
    }

    #[test]
    fn test_default_window_bounds() {
        let splitter = RecursiveSplitter::from_config(&PipelineConfig::default()).unwrap();
        let text = (0..600).map(|i| format!("word{}", i)).collect::<Vec<_>>().join(" ");
        let chunks = splitter.split_text(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 1000);
        }
        // consecutive windows share text
        let tail: String = chunks[0].split(' ').last().unwrap().to_string();
        assert!(chunks[1].contains(&tail));
    }

    #[test]
    fn test_multibyte_lengths_counted_in_chars() {
        let splitter = RecursiveSplitter::new(4, 0).unwrap();
        assert_eq!(splitter.split_text("ééééé"), vec!["éééé", "é"]);
    }

    #[test]
    fn test_rejects_invalid_sizes() {
        assert!(RecursiveSplitter::new(0, 0).is_err());
        assert!(RecursiveSplitter::new(100, 100).is_err());
    }

    #[test]
    fn test_split_keep_separator() {
        assert_eq!(split_keep_separator("a b c", " "), vec!["a", " b", " c"]);
        assert_eq!(split_keep_separator(" a", " "), vec![" a"]);
        assert_eq!(split_keep_separator("ab", ""), vec!["a", "b"]);
    }
}
