use crate::{Error, Result, Vector};
use rayon::prelude::*;

/// Exact nearest-neighbour search by inner product.
///
/// Vectors are unit-normalized on insert and queries are normalized before
/// scanning, so scores are cosine similarities in [-1, 1]. Position in the
/// index is insertion order.
#[derive(Debug, Clone)]
pub struct FlatIpIndex {
    dim: usize,
    vectors: Vec<Vector>,
}

impl FlatIpIndex {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            vectors: Vec::new(),
        }
    }

    /// Build from a batch of vectors in one go
    pub fn from_vectors(dim: usize, vectors: Vec<Vector>) -> Result<Self> {
        let mut index = Self::new(dim);
        index.add_batch(vectors)?;
        Ok(index)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn add_batch(&mut self, vectors: Vec<Vector>) -> Result<()> {
        for v in &vectors {
            self.check_dim(v)?;
        }
        let normalized: Vec<Vector> = vectors.into_par_iter().map(|v| v.normalized()).collect();
        self.vectors.extend(normalized);
        Ok(())
    }

    /// Best `(score, position)`; ties go to the lowest position.
    /// `None` only when the index is empty.
    pub fn search_top1(&self, query: &Vector) -> Result<Option<(f32, usize)>> {
        self.check_dim(query)?;
        let query = query.normalized();

        let mut best: Option<(f32, usize)> = None;
        for (position, vector) in self.vectors.iter().enumerate() {
            let score = vector.dot(&query);
            match best {
                Some((best_score, _)) if score <= best_score => {}
                _ => best = Some((score, position)),
            }
        }
        Ok(best)
    }

    fn check_dim(&self, vector: &Vector) -> Result<()> {
        if vector.dim() != self.dim {
            return Err(Error::InvalidDimension {
                expected: self.dim,
                actual: vector.dim(),
            });
        }
        Ok(())
    }
}
