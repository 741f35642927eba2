//! Similarity indexes over the reference set
//!
//! Both strategies answer the same question: which reference text is the
//! closest to this query, and how close is it. Positions refer to the order
//! of the texts the index was built from. Ties go to the earliest position.
//! An index is immutable once built and can be queried from many threads.

use crate::embedder::{EmbedderHandle, TextEmbedder};
use crate::fuzz::{ratio, sort_tokens};
use crate::strategy::{MatchConfig, Strategy};
use rayon::prelude::*;
use std::sync::Arc;
use tasador_core::{Error, FlatIpIndex, Result, Vector};
use tracing::debug;

/// Best reference for one query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopMatch {
    /// Similarity in the strategy's native scale
    pub score: f64,
    /// Position of the reference text
    pub index: usize,
}

pub trait SimilarityIndex: Send + Sync {
    fn strategy(&self) -> Strategy;

    /// Number of indexed reference texts
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn query(&self, text: &str) -> Result<TopMatch>;

    /// Answers in input order
    fn query_batch(&self, texts: &[&str]) -> Result<Vec<TopMatch>> {
        texts.par_iter().map(|text| self.query(text)).collect()
    }
}

/// Build the index selected by `config` over `texts`.
///
/// The embedder is only touched by the semantic strategy.
pub fn build_index(
    config: &MatchConfig,
    texts: &[&str],
    embedder: &EmbedderHandle,
) -> Result<Box<dyn SimilarityIndex>> {
    match config.strategy {
        Strategy::Lexical => Ok(Box::new(LexicalIndex::build(texts)?)),
        Strategy::Semantic => Ok(Box::new(SemanticIndex::build(
            texts,
            embedder.get()?,
            config.embed_batch_size,
        )?)),
    }
}

/// Token-sort ratio against every reference, 0–100
#[derive(Debug, Clone)]
pub struct LexicalIndex {
    // reference texts with their tokens already sorted
    sorted: Vec<String>,
}

impl LexicalIndex {
    pub fn build(texts: &[&str]) -> Result<Self> {
        if texts.is_empty() {
            return Err(Error::EmptyReferenceSet);
        }
        let sorted: Vec<String> = texts.par_iter().map(|t| sort_tokens(t)).collect();
        debug!(references = sorted.len(), "Built lexical index");
        Ok(Self { sorted })
    }
}

impl SimilarityIndex for LexicalIndex {
    fn strategy(&self) -> Strategy {
        Strategy::Lexical
    }

    fn len(&self) -> usize {
        self.sorted.len()
    }

    fn query(&self, text: &str) -> Result<TopMatch> {
        let query = sort_tokens(text);
        let mut best: Option<TopMatch> = None;
        for (index, reference) in self.sorted.iter().enumerate() {
            let score = ratio(&query, reference);
            match best {
                Some(b) if score <= b.score => {}
                _ => best = Some(TopMatch { score, index }),
            }
        }
        best.ok_or(Error::EmptyReferenceSet)
    }
}

/// Unit-normalized embeddings searched by exact inner product, -1–1
pub struct SemanticIndex {
    embedder: Arc<dyn TextEmbedder>,
    vectors: FlatIpIndex,
    batch_size: usize,
}

impl SemanticIndex {
    pub fn build(texts: &[&str], embedder: Arc<dyn TextEmbedder>, batch_size: usize) -> Result<Self> {
        if texts.is_empty() {
            return Err(Error::EmptyReferenceSet);
        }
        let batch_size = batch_size.max(1);
        let embeddings = embed_in_batches(embedder.as_ref(), texts, batch_size)?;
        let vectors = FlatIpIndex::from_vectors(embedder.dimension(), embeddings)?;
        debug!(
            references = vectors.len(),
            dimension = vectors.dim(),
            embedder = embedder.name(),
            "Built semantic index"
        );
        Ok(Self {
            embedder,
            vectors,
            batch_size,
        })
    }

    fn search(&self, vector: &Vector) -> Result<TopMatch> {
        match self.vectors.search_top1(vector)? {
            Some((score, index)) => Ok(TopMatch {
                score: f64::from(score),
                index,
            }),
            None => Err(Error::EmptyReferenceSet),
        }
    }
}

impl SimilarityIndex for SemanticIndex {
    fn strategy(&self) -> Strategy {
        Strategy::Semantic
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn query(&self, text: &str) -> Result<TopMatch> {
        let mut embedded = self.embedder.embed_batch(&[text])?;
        match embedded.pop() {
            Some(vector) => self.search(&vector),
            None => Err(Error::Embedding("embedder returned no vector".to_string())),
        }
    }

    fn query_batch(&self, texts: &[&str]) -> Result<Vec<TopMatch>> {
        let embeddings = embed_in_batches(self.embedder.as_ref(), texts, self.batch_size)?;
        embeddings.par_iter().map(|v| self.search(v)).collect()
    }
}

fn embed_in_batches(embedder: &dyn TextEmbedder, texts: &[&str], batch_size: usize) -> Result<Vec<Vector>> {
    let mut out = Vec::with_capacity(texts.len());
    for chunk in texts.chunks(batch_size) {
        let embedded = embedder.embed_batch(chunk)?;
        if embedded.len() != chunk.len() {
            return Err(Error::Embedding(format!(
                "embedder returned {} vectors for {} texts",
                embedded.len(),
                chunk.len()
            )));
        }
        out.extend(embedded);
    }
    Ok(out)
}
