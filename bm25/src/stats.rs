use crate::error::{Bm25Error, Result};
use crate::index::Document;
use crate::TermId;
use std::collections::HashMap;

/// Corpus statistics derived once from the consolidated documents.
#[derive(Debug, Clone)]
pub struct Statistics {
    pub doc_lens: Vec<u32>,
    /// Sparse term frequencies, one map per document holding only its terms.
    pub tf: Vec<HashMap<TermId, u32>>,
    pub df: Vec<u32>,
    pub idf: Vec<f32>,
    pub average_dl: f32,
    /// Mean idf before negative values were floored.
    pub average_idf: f32,
    pub floor_value: f32,
    pub floored_terms: usize,
}

/// Robertson-Sparck Jones idf without the +1 shift; negative for terms that
/// occur in more than half of the documents.
pub fn raw_idf(total_docs: usize, df: u32) -> f64 {
    let n = total_docs as f64;
    let df = df as f64;
    (n - df + 0.5).ln() - (df + 0.5).ln()
}

impl Statistics {
    pub fn compute(docs: &[Document], vocab_size: usize, epsilon: f32) -> Result<Self> {
        if docs.is_empty() || vocab_size == 0 {
            return Err(Bm25Error::EmptyCorpus);
        }
        let total_docs = docs.len();

        let mut doc_lens = Vec::with_capacity(total_docs);
        let mut tf = Vec::with_capacity(total_docs);
        let mut df = vec![0u32; vocab_size];
        let mut total_len: u64 = 0;
        for doc in docs {
            let mut counts: HashMap<TermId, u32> = HashMap::with_capacity(doc.unique.len());
            for &t in &doc.tokens {
                *counts.entry(t).or_insert(0) += 1;
            }
            for &t in &doc.unique {
                if counts.get(&t).copied().unwrap_or(0) > 0 {
                    df[t as usize] += 1;
                }
            }
            let len = doc.len() as u32;
            total_len += len as u64;
            doc_lens.push(len);
            tf.push(counts);
        }
        let average_dl = (total_len as f64 / total_docs as f64) as f32;

        let raw: Vec<f64> = df.iter().map(|&d| raw_idf(total_docs, d)).collect();
        let average_idf = raw.iter().sum::<f64>() / raw.len() as f64;
        let floor_value = (epsilon as f64 * average_idf) as f32;
        let mut floored_terms = 0;
        let idf = raw
            .iter()
            .map(|&v| {
                if v < 0.0 {
                    floored_terms += 1;
                    floor_value
                } else {
                    v as f32
                }
            })
            .collect();

        tracing::info!(
            total_docs,
            vocab_size,
            average_dl,
            average_idf,
            floor_value,
            floored_terms,
            "computed corpus statistics"
        );

        Ok(Self {
            doc_lens,
            tf,
            df,
            idf,
            average_dl,
            average_idf: average_idf as f32,
            floor_value,
            floored_terms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(tokens: &[TermId]) -> Document {
        let mut unique = Vec::new();
        for &t in tokens {
            if !unique.contains(&t) {
                unique.push(t);
            }
        }
        Document { tokens: tokens.to_vec(), unique }
    }

    #[test]
    fn counts_tf_df_and_lengths() {
        let docs = vec![doc(&[0, 1, 0, 2]), doc(&[1, 3]), doc(&[0])];
        let s = Statistics::compute(&docs, 4, 0.25).unwrap();
        assert_eq!(s.doc_lens, vec![4, 2, 1]);
        assert_eq!(s.tf[0].get(&0), Some(&2));
        assert_eq!(s.tf[0].get(&3), None);
        assert_eq!(s.df, vec![2, 2, 1, 1]);
        assert!((s.average_dl - 7.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn negative_idf_is_replaced_by_floor() {
        // term 0 is in every document
        let docs = vec![doc(&[0, 1]), doc(&[0, 2]), doc(&[0, 3])];
        let s = Statistics::compute(&docs, 4, 0.25).unwrap();
        assert!(raw_idf(3, 3) < 0.0);
        let expected_avg = (raw_idf(3, 3) + 3.0 * raw_idf(3, 1)) / 4.0;
        assert!((s.average_idf as f64 - expected_avg).abs() < 1e-6);
        assert_eq!(s.idf[0], s.floor_value);
        assert_eq!(s.floored_terms, 1);
        assert!((s.idf[1] as f64 - raw_idf(3, 1)).abs() < 1e-6);
    }

    #[test]
    fn no_documents_is_an_error() {
        assert!(matches!(Statistics::compute(&[], 0, 0.25), Err(Bm25Error::EmptyCorpus)));
    }

    #[test]
    fn epsilon_zero_floors_to_zero() {
        let docs = vec![doc(&[0]), doc(&[0, 1])];
        let s = Statistics::compute(&docs, 2, 0.0).unwrap();
        assert_eq!(s.idf[0], 0.0);
    }
}
