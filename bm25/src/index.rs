use crate::corpus::CorpusBuffer;
use crate::error::{Bm25Error, Result};
use crate::partition::partition_lines;
use crate::scorer::Bm25Params;
use crate::stats::Statistics;
use crate::tokenizer::{split_terms, tokenize_partition, LocalPartition};
use crate::vocab::Vocabulary;
use crate::{DocId, TermId};
use serde::Serialize;
use std::collections::HashMap;
use std::thread;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Every token occurrence, in corpus order.
    pub tokens: Vec<TermId>,
    /// Distinct tokens in first-seen order.
    pub unique: Vec<TermId>,
}

impl Document {
    pub fn len(&self) -> usize { self.tokens.len() }
    pub fn is_empty(&self) -> bool { self.tokens.is_empty() }

    fn translate(mut self, table: &[TermId]) -> Self {
        for t in self.tokens.iter_mut().chain(self.unique.iter_mut()) {
            *t = table[*t as usize];
        }
        self
    }
}

/// Headline numbers of a built index.
#[derive(Debug, Clone, Serialize)]
pub struct IndexSummary {
    pub total_docs: usize,
    pub vocab_size: usize,
    pub average_dl: f32,
    pub average_idf: f32,
    pub floor_value: f32,
    pub floored_terms: usize,
    pub params: Bm25Params,
}

pub struct IndexBuilder<'c> {
    corpus: &'c CorpusBuffer,
    params: Bm25Params,
}

impl<'c> IndexBuilder<'c> {
    pub fn new(corpus: &'c CorpusBuffer) -> Self {
        Self { corpus, params: Bm25Params::default() }
    }

    pub fn params(mut self, params: Bm25Params) -> Self {
        self.params = params;
        self
    }

    /// Tokenize the corpus on `threads` workers, fold their results into one
    /// vocabulary and document list, then compute the statistics.
    ///
    /// Workers only read the corpus. Their results are merged on this thread in
    /// partition order once every worker has been joined, so a failed worker
    /// aborts the whole build before anything is merged.
    pub fn build(self, threads: usize) -> Result<Bm25Index> {
        self.params.validate()?;
        if threads == 0 {
            return Err(Bm25Error::InvalidThreadCount);
        }
        let lines = self.corpus.line_count();
        // more workers than lines would only tokenize empty ranges
        let workers = threads.min(lines.max(1));
        let ranges = partition_lines(lines, workers)?;
        tracing::info!(threads, workers, lines, "building index");

        let corpus = self.corpus;
        let partitions: Vec<LocalPartition<'_>> = thread::scope(|s| {
            let spawned: Vec<_> = ranges
                .into_iter()
                .enumerate()
                .map(|(worker, lines)| {
                    thread::Builder::new()
                        .name(format!("bm25-worker-{worker}"))
                        .spawn_scoped(s, move || {
                            let text = &corpus.as_str()[corpus.byte_range(lines.clone())];
                            let part = tokenize_partition(text);
                            tracing::debug!(
                                worker,
                                first_line = lines.start,
                                lines = lines.len(),
                                docs = part.docs.len(),
                                terms = part.vocab.len(),
                                "tokenized partition"
                            );
                            part
                        })
                        .map_err(|source| Bm25Error::WorkerSpawn { worker, source })
                })
                .collect();
            // join every started worker before reporting; an unjoined
            // panicked thread would make the scope itself panic
            let joined: Vec<Result<LocalPartition<'_>>> = spawned
                .into_iter()
                .enumerate()
                .map(|(worker, h)| {
                    h?.join().map_err(|_| Bm25Error::WorkerPanicked { worker })
                })
                .collect();
            joined.into_iter().collect::<Result<Vec<_>>>()
        })?;

        let (vocab, docs) = consolidate(partitions);
        let stats = Statistics::compute(&docs, vocab.len(), self.params.epsilon)?;
        Ok(Bm25Index { params: self.params, vocab, docs, stats })
    }
}

/// Single-threaded reduction: merge each worker's vocabulary, rewrite its
/// documents into global ids and append them.
fn consolidate(partitions: Vec<LocalPartition<'_>>) -> (Vocabulary, Vec<Document>) {
    let mut vocab = Vocabulary::new();
    let total: usize = partitions.iter().map(|p| p.docs.len()).sum();
    let mut docs = Vec::with_capacity(total);
    for part in partitions {
        let table = vocab.merge_local(&part.vocab);
        docs.extend(part.docs.into_iter().map(|d| d.translate(&table)));
    }
    (vocab, docs)
}

/// Read-only BM25 index over one corpus.
#[derive(Debug, Clone)]
pub struct Bm25Index {
    pub(crate) params: Bm25Params,
    pub(crate) vocab: Vocabulary,
    pub(crate) docs: Vec<Document>,
    pub(crate) stats: Statistics,
}

impl Bm25Index {
    pub fn params(&self) -> &Bm25Params { &self.params }
    pub fn vocabulary(&self) -> &Vocabulary { &self.vocab }
    pub fn vocab_size(&self) -> usize { self.vocab.len() }
    pub fn total_docs(&self) -> usize { self.docs.len() }
    pub fn average_dl(&self) -> f32 { self.stats.average_dl }
    pub fn average_idf(&self) -> f32 { self.stats.average_idf }
    pub fn floor_value(&self) -> f32 { self.stats.floor_value }
    pub fn doc_lens(&self) -> &[u32] { &self.stats.doc_lens }
    pub fn df_list(&self) -> &[u32] { &self.stats.df }
    pub fn idf_list(&self) -> &[f32] { &self.stats.idf }

    pub(crate) fn check_term(&self, id: TermId) -> Result<usize> {
        let idx = id as usize;
        if idx < self.vocab.len() {
            Ok(idx)
        } else {
            Err(Bm25Error::UnknownTerm { id, vocab_size: self.vocab.len() })
        }
    }

    pub(crate) fn check_doc(&self, id: DocId) -> Result<usize> {
        let idx = id as usize;
        if idx < self.docs.len() {
            Ok(idx)
        } else {
            Err(Bm25Error::UnknownDocument { id, total_docs: self.docs.len() })
        }
    }

    pub fn term(&self, id: TermId) -> Result<&str> {
        self.vocab
            .word(id)
            .ok_or(Bm25Error::UnknownTerm { id, vocab_size: self.vocab.len() })
    }

    /// Length of a term in bytes.
    pub fn term_len(&self, id: TermId) -> Result<usize> {
        self.term(id).map(str::len)
    }

    pub fn term_id(&self, word: &str) -> Option<TermId> {
        self.vocab.get(word)
    }

    pub fn document(&self, id: DocId) -> Result<&Document> {
        Ok(&self.docs[self.check_doc(id)?])
    }

    pub fn doc_len(&self, id: DocId) -> Result<u32> {
        Ok(self.stats.doc_lens[self.check_doc(id)?])
    }

    pub fn df(&self, term: TermId) -> Result<u32> {
        Ok(self.stats.df[self.check_term(term)?])
    }

    pub fn idf(&self, term: TermId) -> Result<f32> {
        Ok(self.stats.idf[self.check_term(term)?])
    }

    /// Occurrences of `term` in `doc`; 0 when the term does not occur there.
    pub fn tf(&self, doc: DocId, term: TermId) -> Result<u32> {
        let d = self.check_doc(doc)?;
        self.check_term(term)?;
        Ok(self.stats.tf[d].get(&term).copied().unwrap_or(0))
    }

    /// The non-zero term frequencies of one document.
    pub fn tf_row(&self, doc: DocId) -> Result<&HashMap<TermId, u32>> {
        Ok(&self.stats.tf[self.check_doc(doc)?])
    }

    /// Map raw query text to term ids using the tokenizer's delimiter rule.
    pub fn resolve_query(&self, text: &str) -> Result<Vec<TermId>> {
        split_terms(text)
            .map(|w| self.vocab.get(w).ok_or_else(|| Bm25Error::UnknownWord(w.to_owned())))
            .collect()
    }

    pub fn summary(&self) -> IndexSummary {
        IndexSummary {
            total_docs: self.total_docs(),
            vocab_size: self.vocab_size(),
            average_dl: self.stats.average_dl,
            average_idf: self.stats.average_idf,
            floor_value: self.stats.floor_value,
            floored_terms: self.stats.floored_terms,
            params: self.params.clone(),
        }
    }
}
