use bm25::{Bm25Params, DocId, IndexSummary};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct BuildReport {
    #[serde(flatten)]
    pub summary: IndexSummary,
    pub build_s: f64,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub query: String,
    pub took_s: f64,
    /// Documents containing at least one query term.
    pub total_hits: usize,
    pub results: Vec<QueryHit>,
}

#[derive(Debug, Serialize)]
pub struct QueryHit {
    pub doc_id: DocId,
    pub score: f32,
    /// Document rebuilt from its tokens.
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub threads: usize,
    pub iterations: usize,
    pub params: Bm25Params,
    pub load_s: Vec<f64>,
    pub build_s: Vec<f64>,
    pub mean: f64,
    pub var: f64,
    pub std: f64,
    pub created_at: String,
}

pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Population variance, E[x^2] - E[x]^2, clamped at 0 against rounding.
pub fn var(data: &[f64]) -> f64 {
    let squares: Vec<f64> = data.iter().map(|d| d * d).collect();
    (mean(&squares) - mean(data).powi(2)).max(0.0)
}

pub fn std(data: &[f64]) -> f64 {
    var(data).sqrt()
}

pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "".into())
}
