//! Text embedders
//!
//! The semantic strategy needs a sentence-embedding model. Loading one is
//! expensive, so the model lives behind an [`EmbedderHandle`]: an owned,
//! lazily-initialized resource that callers create once and pass to every
//! index build. Tests hand in their own [`TextEmbedder`] instead.

use once_cell::sync::OnceCell;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;
use tasador_core::{Error, Result, Vector};
use tracing::info;

/// Dimension of AllMiniLML6V2 sentence embeddings
pub const MINILM_DIM: usize = 384;

/// Default dimension for hashed embeddings
pub const DEFAULT_HASHING_DIM: usize = 384;

/// Maps texts to fixed-dimension vectors
pub trait TextEmbedder: Send + Sync {
    fn name(&self) -> &str;

    fn dimension(&self) -> usize;

    /// One vector per input text, in input order
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vector>>;
}

/// Deterministic embedder hashing character trigrams and words into buckets.
///
/// Needs no model download. Texts sharing many trigrams and words land
/// close together; it does not know synonyms.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn embed_text(&self, text: &str) -> Vector {
        let mut vector = vec![0.0f32; self.dim];

        for trigram in generate_trigrams(text) {
            vector[self.bucket(&trigram)] += 1.0;
        }
        // Words contribute more than trigrams
        for word in text.split_whitespace() {
            vector[self.bucket(word)] += 2.0;
        }

        Vector::new(vector).normalized()
    }

    fn bucket<T: Hash + ?Sized>(&self, value: &T) -> usize {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        (hasher.finish() % self.dim as u64) as usize
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASHING_DIM)
    }
}

impl TextEmbedder for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

/// Character trigrams of a string padded with two spaces on each side
fn generate_trigrams(s: &str) -> HashSet<String> {
    if s.is_empty() {
        return HashSet::new();
    }
    let padded = format!("  {}  ", s);
    let chars: Vec<char> = padded.chars().collect();
    chars.windows(3).map(|w| w.iter().collect::<String>()).collect()
}

/// AllMiniLML6V2 sentence embeddings through fastembed (onnxruntime)
#[cfg(feature = "fastembed")]
pub struct MiniLmEmbedder {
    model: parking_lot::Mutex<fastembed::TextEmbedding>,
    batch_size: usize,
}

#[cfg(feature = "fastembed")]
impl MiniLmEmbedder {
    /// Load the model, downloading it on first use
    pub fn load(batch_size: usize) -> Result<Self> {
        let model = fastembed::TextEmbedding::try_new(
            fastembed::InitOptions::new(fastembed::EmbeddingModel::AllMiniLML6V2)
                .with_show_download_progress(false),
        )
        .map_err(|e| Error::Embedding(format!("failed to load AllMiniLML6V2: {}", e)))?;

        Ok(Self {
            model: parking_lot::Mutex::new(model),
            batch_size: batch_size.max(1),
        })
    }
}

#[cfg(feature = "fastembed")]
impl TextEmbedder for MiniLmEmbedder {
    fn name(&self) -> &str {
        "all-MiniLM-L6-v2"
    }

    fn dimension(&self) -> usize {
        MINILM_DIM
    }

    #[allow(unused_mut)]
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        let mut model = self.model.lock();
        let embeddings = model
            .embed(texts.to_vec(), Some(self.batch_size))
            .map_err(|e| Error::Embedding(e.to_string()))?;
        Ok(embeddings.into_iter().map(Vector::new).collect())
    }
}

/// Which embedder a handle loads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedderKind {
    /// Pretrained AllMiniLML6V2 (requires the `fastembed` feature)
    MiniLm,
    /// Offline trigram hashing
    Hashing,
}

impl Default for EmbedderKind {
    /// The sentence model when it is compiled in, hashing otherwise
    fn default() -> Self {
        if cfg!(feature = "fastembed") {
            EmbedderKind::MiniLm
        } else {
            EmbedderKind::Hashing
        }
    }
}

impl FromStr for EmbedderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "minilm" | "all-minilm-l6-v2" => Ok(EmbedderKind::MiniLm),
            "hashing" | "hash" => Ok(EmbedderKind::Hashing),
            other => Err(Error::InvalidConfig(format!("unknown embedder: {}", other))),
        }
    }
}

impl fmt::Display for EmbedderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedderKind::MiniLm => f.write_str("minilm"),
            EmbedderKind::Hashing => f.write_str("hashing"),
        }
    }
}

type Loader = Box<dyn Fn() -> Result<Arc<dyn TextEmbedder>> + Send + Sync>;

/// Owned, lazily-initialized embedder.
///
/// The loader runs at most once successfully; a failed load is reported to
/// the caller and retried on the next [`EmbedderHandle::get`].
pub struct EmbedderHandle {
    loader: Loader,
    cell: OnceCell<Arc<dyn TextEmbedder>>,
}

impl EmbedderHandle {
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn TextEmbedder>> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            cell: OnceCell::new(),
        }
    }

    /// Handle around an embedder that is already loaded
    pub fn preloaded(embedder: Arc<dyn TextEmbedder>) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(embedder.clone());
        Self {
            loader: Box::new(move || Ok(embedder.clone())),
            cell,
        }
    }

    pub fn for_kind(kind: EmbedderKind, batch_size: usize) -> Self {
        match kind {
            EmbedderKind::Hashing => Self::new(|| Ok(Arc::new(HashingEmbedder::default()) as Arc<dyn TextEmbedder>)),
            EmbedderKind::MiniLm => Self::new(move || load_minilm(batch_size)),
        }
    }

    /// The embedder, loading it on first call
    pub fn get(&self) -> Result<Arc<dyn TextEmbedder>> {
        self.cell
            .get_or_try_init(|| {
                let embedder = (self.loader)()?;
                info!(
                    embedder = embedder.name(),
                    dimension = embedder.dimension(),
                    "Embedding model loaded"
                );
                Ok(embedder)
            })
            .cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl fmt::Debug for EmbedderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedderHandle")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(feature = "fastembed")]
fn load_minilm(batch_size: usize) -> Result<Arc<dyn TextEmbedder>> {
    Ok(Arc::new(MiniLmEmbedder::load(batch_size)?))
}

#[cfg(not(feature = "fastembed"))]
fn load_minilm(_batch_size: usize) -> Result<Arc<dyn TextEmbedder>> {
    Err(Error::Embedding(
        "tasador was built without the `fastembed` feature; use the hashing embedder or rebuild with --features fastembed".to_string(),
    ))
}
