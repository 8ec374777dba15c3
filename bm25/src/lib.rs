//! BM25 scoring over a line-delimited corpus.
//!
//! Every line of the corpus is one document and tokens are separated by
//! spaces. [`IndexBuilder`] tokenizes the corpus on a fixed number of worker
//! threads, folds the per-worker results into one [`Bm25Index`], and the index
//! then answers score and statistics queries by integer id.

pub mod corpus;
pub mod error;
pub mod index;
pub mod partition;
pub mod scorer;
pub mod stats;
pub mod tokenizer;
pub mod vocab;

pub type TermId = u32;
pub type DocId = u32;

pub use corpus::CorpusBuffer;
pub use error::{Bm25Error, Result};
pub use index::{Bm25Index, Document, IndexBuilder, IndexSummary};
pub use scorer::Bm25Params;
pub use vocab::Vocabulary;
