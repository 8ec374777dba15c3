use crate::TermId;
use std::collections::HashMap;

/// Global word <-> id mapping. Ids are dense, handed out by a monotonic
/// counter, and never reused or renumbered.
#[derive(Debug, Default, Clone)]
pub struct Vocabulary {
    ids: HashMap<String, TermId>,
    words: Vec<String>,
}

impl Vocabulary {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.words.len() }
    pub fn is_empty(&self) -> bool { self.words.is_empty() }

    pub fn get(&self, word: &str) -> Option<TermId> {
        self.ids.get(word).copied()
    }

    pub fn word(&self, id: TermId) -> Option<&str> {
        self.words.get(id as usize).map(String::as_str)
    }

    /// Words in id order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    fn insert(&mut self, word: &str) -> TermId {
        if let Some(&id) = self.ids.get(word) {
            return id;
        }
        let id = self.words.len() as TermId;
        self.words.push(word.to_owned());
        self.ids.insert(word.to_owned(), id);
        id
    }

    /// Fold a worker-local vocabulary (local id = index) into this one and
    /// return the local -> global translation table.
    pub fn merge_local(&mut self, local: &[&str]) -> Vec<TermId> {
        local.iter().map(|word| self.insert(word)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_assigns_new_ids_and_reuses_known_words() {
        let mut v = Vocabulary::new();
        assert_eq!(v.merge_local(&["the", "cat"]), vec![0, 1]);
        assert_eq!(v.merge_local(&["dog", "the", "sat"]), vec![2, 0, 3]);
        assert_eq!(v.len(), 4);
        assert_eq!(v.get("sat"), Some(3));
        assert_eq!(v.word(2), Some("dog"));
        assert_eq!(v.get("ran"), None);
    }

    #[test]
    fn ids_are_stable_across_merges() {
        let mut v = Vocabulary::new();
        v.merge_local(&["a", "b"]);
        let before: Vec<String> = v.words().map(str::to_owned).collect();
        v.merge_local(&["c", "b", "a"]);
        let after: Vec<&str> = v.words().take(2).collect();
        assert_eq!(after, before);
    }

    #[test]
    fn empty_local_vocab_translates_to_nothing() {
        let mut v = Vocabulary::new();
        assert!(v.merge_local(&[]).is_empty());
        assert!(v.is_empty());
    }
}
