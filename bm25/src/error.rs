use std::path::PathBuf;
use thiserror::Error;

use crate::{DocId, TermId};

#[derive(Error, Debug)]
pub enum Bm25Error {
    /// The corpus file could not be opened or read.
    #[error("cannot read corpus {}: {source}", path.display())]
    CorpusUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corpus is not valid UTF-8 (first bad byte at offset {offset})")]
    InvalidUtf8 { offset: usize },

    #[error("thread count must be at least 1")]
    InvalidThreadCount,

    /// No line of the corpus produced a document.
    #[error("empty corpus: no documents to index")]
    EmptyCorpus,

    #[error("unknown term id {id} (vocabulary size {vocab_size})")]
    UnknownTerm { id: TermId, vocab_size: usize },

    #[error("unknown document id {id} (total documents {total_docs})")]
    UnknownDocument { id: DocId, total_docs: usize },

    #[error("word {0:?} is not in the vocabulary")]
    UnknownWord(String),

    #[error("cannot start indexing worker {worker}: {source}")]
    WorkerSpawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("indexing worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    #[error("invalid BM25 parameters: {0}")]
    InvalidParams(String),
}

pub type Result<T> = std::result::Result<T, Bm25Error>;
