use crate::index::Document;
use crate::TermId;
use std::collections::{HashMap, HashSet};

/// Space and newline are the only token delimiters.
#[inline]
pub fn is_delimiter(b: u8) -> bool {
    b == b' ' || b == b'\n'
}

/// Split text into terms with the same rule the index tokenizer applies.
/// Runs of delimiters never yield empty terms.
pub fn split_terms(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c == ' ' || c == '\n').filter(|t| !t.is_empty())
}

/// Output of one worker: its own vocabulary and its documents, both keyed by
/// worker-local term ids.
#[derive(Debug, Default)]
pub struct LocalPartition<'a> {
    /// Local id -> word, in first-seen order.
    pub vocab: Vec<&'a str>,
    pub docs: Vec<Document>,
}

struct LocalTokenizer<'a> {
    ids: HashMap<&'a str, TermId>,
    out: LocalPartition<'a>,
    tokens: Vec<TermId>,
    unique: Vec<TermId>,
    seen: HashSet<TermId>,
}

impl<'a> LocalTokenizer<'a> {
    fn new() -> Self {
        Self {
            ids: HashMap::new(),
            out: LocalPartition::default(),
            tokens: Vec::new(),
            unique: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn push_token(&mut self, word: &'a str) {
        let vocab = &mut self.out.vocab;
        let id = *self.ids.entry(word).or_insert_with(|| {
            vocab.push(word);
            (vocab.len() - 1) as TermId
        });
        if self.seen.insert(id) {
            self.unique.push(id);
        }
        self.tokens.push(id);
    }

    fn close_document(&mut self) {
        if self.tokens.is_empty() {
            return;
        }
        self.seen.clear();
        self.out.docs.push(Document {
            tokens: std::mem::take(&mut self.tokens),
            unique: std::mem::take(&mut self.unique),
        });
    }
}

/// Tokenize a line-aligned slice of the corpus into a worker-local vocabulary
/// and documents. Lines without any token produce no document; a final line
/// without a trailing newline is closed at the end of the slice.
pub fn tokenize_partition(text: &str) -> LocalPartition<'_> {
    let mut t = LocalTokenizer::new();
    let mut start: Option<usize> = None;
    for (i, &b) in text.as_bytes().iter().enumerate() {
        if is_delimiter(b) {
            if let Some(s) = start.take() {
                t.push_token(&text[s..i]);
            }
            if b == b'\n' {
                t.close_document();
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        t.push_token(&text[s..]);
    }
    t.close_document();
    t.out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_terms_skips_repeated_delimiters() {
        let terms: Vec<&str> = split_terms("  the   cat\nsat  ").collect();
        assert_eq!(terms, vec!["the", "cat", "sat"]);
    }

    #[test]
    fn split_terms_keeps_tabs_inside_terms() {
        let terms: Vec<&str> = split_terms("a\tb c").collect();
        assert_eq!(terms, vec!["a\tb", "c"]);
    }

    #[test]
    fn local_ids_follow_first_seen_order() {
        let p = tokenize_partition("b a b\na c\n");
        assert_eq!(p.vocab, vec!["b", "a", "c"]);
        assert_eq!(p.docs.len(), 2);
        assert_eq!(p.docs[0].tokens, vec![0, 1, 0]);
        assert_eq!(p.docs[0].unique, vec![0, 1]);
        assert_eq!(p.docs[1].tokens, vec![1, 2]);
        assert_eq!(p.docs[1].unique, vec![1, 2]);
    }

    #[test]
    fn unique_list_is_per_document() {
        let p = tokenize_partition("x y\ny x\n");
        assert_eq!(p.docs[1].unique, vec![1, 0]);
    }

    #[test]
    fn trailing_space_does_not_merge_lines() {
        let p = tokenize_partition("a b \nc\n");
        assert_eq!(p.docs.len(), 2);
        assert_eq!(p.docs[0].tokens.len(), 2);
    }

    #[test]
    fn blank_lines_and_unterminated_tail() {
        let p = tokenize_partition("a\n\n   \nb c");
        assert_eq!(p.docs.len(), 2);
        assert_eq!(p.docs[1].tokens, vec![1, 2]);
    }

    #[test]
    fn multibyte_words_survive() {
        let p = tokenize_partition("café naïve café\n");
        assert_eq!(p.vocab, vec!["café", "naïve"]);
        assert_eq!(p.docs[0].tokens, vec![0, 1, 0]);
    }
}
