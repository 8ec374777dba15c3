use anyhow::{Context, Result};
use bm25::{Bm25Index, Bm25Params, CorpusBuffer, IndexBuilder};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};

mod report;

use report::{BenchReport, BuildReport, QueryHit, QueryResponse};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build BM25 statistics over a line-per-document corpus and score queries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index and print its summary
    Build {
        #[command(flatten)]
        index: IndexArgs,
    },
    /// Build the index and rank documents for a query
    Query {
        #[command(flatten)]
        index: IndexArgs,
        /// Query text, split on spaces like the corpus
        #[arg(long)]
        q: String,
        /// Number of results to print
        #[arg(long, default_value_t = 10)]
        k: usize,
    },
    /// Time repeated builds of the same corpus
    Bench {
        #[command(flatten)]
        index: IndexArgs,
        #[arg(long, default_value_t = 5)]
        iterations: usize,
    },
}

#[derive(Args, Clone)]
struct IndexArgs {
    /// Corpus file, one document per line
    #[arg(long)]
    input: PathBuf,
    /// Worker threads (defaults to the number of CPUs)
    #[arg(long)]
    threads: Option<usize>,
    #[arg(long, default_value_t = 1.5)]
    k1: f32,
    #[arg(long, default_value_t = 0.75)]
    b: f32,
    /// Floor factor for negative idf values
    #[arg(long, default_value_t = 0.25)]
    epsilon: f32,
}

impl IndexArgs {
    fn params(&self) -> Bm25Params {
        Bm25Params::new(self.k1, self.b, self.epsilon)
    }

    fn threads(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        })
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let json = match cli.command {
        Commands::Build { index } => serde_json::to_string_pretty(&run_build(&index)?)?,
        Commands::Query { index, q, k } => serde_json::to_string_pretty(&run_query(&index, &q, k)?)?,
        Commands::Bench { index, iterations } => serde_json::to_string_pretty(&run_bench(&index, iterations)?)?,
    };
    println!("{json}");
    Ok(())
}

fn load(args: &IndexArgs) -> Result<CorpusBuffer> {
    CorpusBuffer::open(&args.input).with_context(|| format!("loading corpus {}", args.input.display()))
}

fn build(args: &IndexArgs, corpus: &CorpusBuffer) -> Result<(Bm25Index, f64)> {
    let start = Instant::now();
    let index = IndexBuilder::new(corpus)
        .params(args.params())
        .build(args.threads())
        .context("building index")?;
    Ok((index, start.elapsed().as_secs_f64()))
}

fn run_build(args: &IndexArgs) -> Result<BuildReport> {
    let corpus = load(args)?;
    let (index, build_s) = build(args, &corpus)?;
    tracing::info!(docs = index.total_docs(), terms = index.vocab_size(), build_s, "index build complete");
    Ok(BuildReport { summary: index.summary(), build_s, created_at: report::now_rfc3339() })
}

fn run_query(args: &IndexArgs, q: &str, k: usize) -> Result<QueryResponse> {
    let corpus = load(args)?;
    let (index, _) = build(args, &corpus)?;

    let start = Instant::now();
    let terms = index.resolve_query(q).with_context(|| format!("resolving query {q:?}"))?;
    let scores = index.scores(&terms)?;
    let total_hits = index.matching_docs(&terms)?;
    let mut results = Vec::new();
    for (doc_id, score) in bm25::scorer::rank(&scores, k) {
        let doc = index.document(doc_id)?;
        let words = doc.tokens.iter().map(|&t| index.term(t)).collect::<bm25::Result<Vec<_>>>()?;
        results.push(QueryHit { doc_id, score, text: words.join(" ") });
    }
    let took_s = start.elapsed().as_secs_f64();
    tracing::debug!(query = q, total_hits, took_s, "query scored");
    Ok(QueryResponse { query: q.to_string(), took_s, total_hits, results })
}

fn run_bench(args: &IndexArgs, iterations: usize) -> Result<BenchReport> {
    let threads = args.threads();
    let mut load_s = Vec::with_capacity(iterations);
    let mut build_s = Vec::with_capacity(iterations);
    for it in 1..=iterations {
        let start = Instant::now();
        let corpus = load(args)?;
        load_s.push(start.elapsed().as_secs_f64());

        let (_, secs) = build(args, &corpus)?;
        tracing::info!(iteration = it, iterations, threads, build_s = secs, "bench build finished");
        build_s.push(secs);
    }
    Ok(BenchReport {
        threads,
        iterations,
        params: args.params(),
        mean: report::mean(&build_s),
        var: report::var(&build_s),
        std: report::std(&build_s),
        load_s,
        build_s,
        created_at: report::now_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(dir: &tempfile::TempDir, body: &str) -> IndexArgs {
        let input = dir.path().join("corpus.txt");
        std::fs::write(&input, body).unwrap();
        IndexArgs { input, threads: Some(2), k1: 1.5, b: 0.75, epsilon: 0.25 }
    }

    #[test]
    fn query_ranks_matching_documents() {
        let dir = tempfile::tempdir().unwrap();
        let a = args(&dir, "rust systems language\npython scripting language\nrust rust memory\nc pointers\ngo channels\n");
        let resp = run_query(&a, "rust", 2).unwrap();
        assert_eq!(resp.total_hits, 2);
        assert_eq!(resp.results[0].doc_id, 2);
        assert_eq!(resp.results[0].text, "rust rust memory");
        assert_eq!(resp.results[1].doc_id, 0);
    }

    #[test]
    fn zero_k_returns_no_results() {
        let dir = tempfile::tempdir().unwrap();
        let a = args(&dir, "rust systems\npython scripting\nc pointers\n");
        let resp = run_query(&a, "rust", 0).unwrap();
        assert!(resp.results.is_empty());
        assert_eq!(resp.total_hits, 1);
    }

    #[test]
    fn hits_count_documents_with_floored_terms() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args(&dir, "rust a\nrust b\nrust c\nd\n");
        a.epsilon = 0.0;
        let resp = run_query(&a, "rust", 10).unwrap();
        assert_eq!(resp.total_hits, 3);
        assert_eq!(resp.results.len(), 4);
        assert!(resp.results.iter().all(|h| h.score == 0.0));
    }

    #[test]
    fn unknown_query_word_fails() {
        let dir = tempfile::tempdir().unwrap();
        let a = args(&dir, "a b\nc d\n");
        let err = run_query(&a, "zebra", 3).unwrap_err();
        assert!(format!("{err:#}").contains("zebra"));
    }

    #[test]
    fn bench_collects_one_timing_per_iteration() {
        let dir = tempfile::tempdir().unwrap();
        let a = args(&dir, "a b\nc d\ne f\n");
        let report = run_bench(&a, 3).unwrap();
        assert_eq!(report.build_s.len(), 3);
        assert_eq!(report.load_s.len(), 3);
        assert!(report.std >= 0.0);
    }

    #[test]
    fn missing_corpus_is_reported() {
        let a = IndexArgs { input: PathBuf::from("/nonexistent/corpus.txt"), threads: Some(1), k1: 1.5, b: 0.75, epsilon: 0.25 };
        let err = run_build(&a).unwrap_err();
        assert!(format!("{err:#}").contains("cannot read corpus"));
    }

    #[test]
    fn cli_parses_query_command() {
        let cli = Cli::try_parse_from(["indexer", "query", "--input", "docs.txt", "--q", "the cat", "--threads", "4"]).unwrap();
        match cli.command {
            Commands::Query { index, q, k } => {
                assert_eq!(q, "the cat");
                assert_eq!(k, 10);
                assert_eq!(index.threads(), 4);
                assert_eq!(index.params(), Bm25Params::default());
            }
            _ => panic!("expected query command"),
        }
    }
}
