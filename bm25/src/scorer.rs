use crate::error::{Bm25Error, Result};
use crate::index::Bm25Index;
use crate::{DocId, TermId};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// BM25 tuning knobs, fixed once an index is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f32,
    /// Length-normalization strength, 0 disables it.
    pub b: f32,
    /// Scales the average idf into the value that replaces negative idfs.
    pub epsilon: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75, epsilon: 0.25 }
    }
}

impl Bm25Params {
    pub fn new(k1: f32, b: f32, epsilon: f32) -> Self {
        Self { k1, b, epsilon }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(Bm25Error::InvalidParams(format!("k1 must be finite and >= 0, got {}", self.k1)));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(Bm25Error::InvalidParams(format!("b must be within [0, 1], got {}", self.b)));
        }
        if !self.epsilon.is_finite() {
            return Err(Bm25Error::InvalidParams(format!("epsilon must be finite, got {}", self.epsilon)));
        }
        Ok(())
    }
}

impl Bm25Index {
    fn check_query(&self, query: &[TermId]) -> Result<()> {
        query.iter().try_for_each(|&t| self.check_term(t).map(|_| ()))
    }

    /// Caller has validated every id.
    fn score_unchecked(&self, query: &[TermId], doc: usize) -> f32 {
        let Bm25Params { k1, b, .. } = self.params;
        let dl = self.stats.doc_lens[doc] as f32;
        let length_norm = k1 * (1.0 - b + b * dl / self.stats.average_dl);
        let row = &self.stats.tf[doc];
        let mut score = 0.0;
        for t in query {
            let tf = match row.get(t) {
                Some(&n) if n > 0 => n as f32,
                _ => continue,
            };
            score += self.stats.idf[*t as usize] * tf * (k1 + 1.0) / (tf + length_norm);
        }
        score
    }

    /// BM25 score of one document. Repeated query terms count once per
    /// occurrence; an empty query scores 0.
    pub fn score(&self, query: &[TermId], doc: DocId) -> Result<f32> {
        let d = self.check_doc(doc)?;
        self.check_query(query)?;
        Ok(self.score_unchecked(query, d))
    }

    /// Scores for every document, indexed by document id.
    pub fn scores(&self, query: &[TermId]) -> Result<Vec<f32>> {
        self.check_query(query)?;
        Ok((0..self.docs.len())
            .into_par_iter()
            .map(|d| self.score_unchecked(query, d))
            .collect())
    }

    /// The `k` best documents, highest score first; equal scores keep id order.
    pub fn top_k(&self, query: &[TermId], k: usize) -> Result<Vec<(DocId, f32)>> {
        Ok(rank(&self.scores(query)?, k))
    }

    /// Documents in which at least one query term occurs, whatever its idf.
    pub fn matching_docs(&self, query: &[TermId]) -> Result<usize> {
        self.check_query(query)?;
        Ok(self
            .stats
            .tf
            .iter()
            .filter(|row| query.iter().any(|t| row.get(t).is_some_and(|&n| n > 0)))
            .count())
    }
}

/// Order a per-document score vector, highest first with ties in id order,
/// and keep the first `k` entries.
pub fn rank(scores: &[f32], k: usize) -> Vec<(DocId, f32)> {
    let mut scored: Vec<(DocId, f32)> = scores
        .iter()
        .enumerate()
        .map(|(d, &s)| (d as DocId, s))
        .collect();
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    scored.truncate(k);
    scored
}
