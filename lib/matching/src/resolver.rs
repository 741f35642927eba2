//! Price resolution
//!
//! Each query item is looked up in the similarity index and accepted when
//! the best score reaches the threshold. Misses are data, not errors: they
//! carry the [`AssignedPrice::NotFound`] sentinel.

use crate::index::{SimilarityIndex, TopMatch};
use crate::reference::ReferenceSet;
use crate::strategy::MatchConfig;
use serde::{Serialize, Serializer};
use std::fmt;
use tasador_core::{Item, Result};

/// Literal used for unresolved items in every rendered output
pub const NOT_FOUND: &str = "not found";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssignedPrice {
    Price(f64),
    NotFound,
}

impl AssignedPrice {
    pub fn as_price(&self) -> Option<f64> {
        match self {
            AssignedPrice::Price(p) => Some(*p),
            AssignedPrice::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, AssignedPrice::Price(_))
    }
}

impl fmt::Display for AssignedPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignedPrice::Price(p) => write!(f, "{}", p),
            AssignedPrice::NotFound => f.write_str(NOT_FOUND),
        }
    }
}

// a number, or the literal "not found"
impl Serialize for AssignedPrice {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            AssignedPrice::Price(p) => serializer.serialize_f64(*p),
            AssignedPrice::NotFound => serializer.serialize_str(NOT_FOUND),
        }
    }
}

/// How a resolution was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    Similarity,
    Code,
}

/// Outcome for one query item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    /// Normalized text of the accepted reference item
    pub matched_text: Option<String>,
    pub matched_code: Option<String>,
    /// Position of the accepted item in the reference set
    pub matched_index: Option<usize>,
    /// Best score in the strategy's native scale, accepted or not
    pub score: f64,
    pub assigned_price: AssignedPrice,
    pub source: MatchSource,
}

impl Resolution {
    fn not_found(score: f64) -> Self {
        Self {
            matched_text: None,
            matched_code: None,
            matched_index: None,
            score,
            assigned_price: AssignedPrice::NotFound,
            source: MatchSource::Similarity,
        }
    }

    fn accepted(reference: &Item, index: usize, score: f64, source: MatchSource) -> Self {
        Self {
            matched_text: Some(reference.normalized_text.clone()),
            matched_code: Some(reference.code.clone()),
            matched_index: Some(index),
            score,
            // usable reference items always carry a price
            assigned_price: reference
                .price
                .map(AssignedPrice::Price)
                .unwrap_or(AssignedPrice::NotFound),
            source,
        }
    }
}

/// Resolves query items against a built index. Never mutates either input.
pub struct Resolver<'a> {
    reference: &'a ReferenceSet,
    index: &'a dyn SimilarityIndex,
    config: &'a MatchConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(reference: &'a ReferenceSet, index: &'a dyn SimilarityIndex, config: &'a MatchConfig) -> Self {
        Self {
            reference,
            index,
            config,
        }
    }

    /// Apply the acceptance threshold to an index answer
    pub fn accept(&self, top: TopMatch) -> Resolution {
        if top.score >= self.config.threshold {
            if let Some(item) = self.reference.get(top.index) {
                return Resolution::accepted(item, top.index, top.score, MatchSource::Similarity);
            }
        }
        Resolution::not_found(top.score)
    }

    pub fn resolve(&self, item: &Item) -> Result<Resolution> {
        if let Some(resolution) = self.code_match(item) {
            return Ok(resolution);
        }
        Ok(self.accept(self.index.query(&item.normalized_text)?))
    }

    /// Resolutions in item order
    pub fn resolve_all(&self, items: &[Item]) -> Result<Vec<Resolution>> {
        let mut resolutions: Vec<Option<Resolution>> = items.iter().map(|i| self.code_match(i)).collect();

        let pending: Vec<usize> = (0..items.len()).filter(|i| resolutions[*i].is_none()).collect();
        let texts: Vec<&str> = pending.iter().map(|i| items[*i].normalized_text.as_str()).collect();
        let answers = self.index.query_batch(&texts)?;

        for (position, top) in pending.into_iter().zip(answers) {
            resolutions[position] = Some(self.accept(top));
        }

        Ok(resolutions
            .into_iter()
            .map(|r| r.unwrap_or_else(|| Resolution::not_found(self.config.strategy.min_score())))
            .collect())
    }

    fn code_match(&self, item: &Item) -> Option<Resolution> {
        if !self.config.exact_code_match {
            return None;
        }
        let position = self.reference.position_of_code(&item.code)?;
        let reference = self.reference.get(position)?;
        Some(Resolution::accepted(
            reference,
            position,
            self.config.strategy.max_score(),
            MatchSource::Code,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::LexicalIndex;
    use crate::strategy::Strategy;

    fn reference() -> ReferenceSet {
        ReferenceSet::from_items(vec![
            Item::new("P01", "Excavación en terreno suelto", Some(120.0)),
            Item::new("P02", "Muro de bloque de hormigón", Some(45.5)),
            Item::new("P03", "Muro de bloque de hormigón", Some(99.0)),
        ])
        .unwrap()
    }

    fn lexical(set: &ReferenceSet) -> LexicalIndex {
        LexicalIndex::build(&set.texts()).unwrap()
    }

    #[test]
    fn test_accepts_above_threshold() {
        let set = reference();
        let index = lexical(&set);
        let config = MatchConfig::new(Strategy::Lexical);
        let resolver = Resolver::new(&set, &index, &config);

        let res = resolver.resolve(&Item::new("N01", "Excavacion en terreno suelto", None)).unwrap();
        assert_eq!(res.assigned_price, AssignedPrice::Price(120.0));
        assert_eq!(res.matched_text.as_deref(), Some("excavacion en terreno suelto"));
        assert_eq!(res.matched_code.as_deref(), Some("P01"));
        assert_eq!(res.source, MatchSource::Similarity);
    }

    #[test]
    fn test_rejects_below_threshold() {
        let set = reference();
        let index = lexical(&set);
        let config = MatchConfig::new(Strategy::Lexical);
        let resolver = Resolver::new(&set, &index, &config);

        let res = resolver.resolve(&Item::new("N02", "Instalación de ascensor panorámico", None)).unwrap();
        assert_eq!(res.assigned_price, AssignedPrice::NotFound);
        assert!(res.matched_text.is_none());
        assert!(res.score < 80.0);
    }

    #[test]
    fn test_duplicate_text_resolves_to_earlier_price() {
        let set = reference();
        let index = lexical(&set);
        let config = MatchConfig::new(Strategy::Lexical);
        let resolver = Resolver::new(&set, &index, &config);

        let res = resolver.resolve(&Item::new("N03", "muro de bloque de hormigon", None)).unwrap();
        assert_eq!(res.assigned_price, AssignedPrice::Price(45.5));
        assert_eq!(res.matched_index, Some(1));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let set = reference();
        let index = lexical(&set);
        let config = MatchConfig::new(Strategy::Lexical).with_threshold(100.0);
        let resolver = Resolver::new(&set, &index, &config);
        let res = resolver.resolve(&Item::new("N04", "Muro de bloque de hormigón", None)).unwrap();
        assert!(res.assigned_price.is_found());
    }

    #[test]
    fn test_code_match_is_opt_in() {
        let set = reference();
        let index = lexical(&set);
        let items = vec![Item::new("P02", "texto sin relacion alguna", None)];

        let off = MatchConfig::new(Strategy::Lexical);
        let res = Resolver::new(&set, &index, &off).resolve_all(&items).unwrap();
        assert_eq!(res[0].assigned_price, AssignedPrice::NotFound);

        let on = MatchConfig::new(Strategy::Lexical).with_exact_code_match(true);
        let res = Resolver::new(&set, &index, &on).resolve_all(&items).unwrap();
        assert_eq!(res[0].assigned_price, AssignedPrice::Price(45.5));
        assert_eq!(res[0].source, MatchSource::Code);
        assert_eq!(res[0].score, 100.0);
    }

    #[test]
    fn test_resolve_all_keeps_order() {
        let set = reference();
        let index = lexical(&set);
        let config = MatchConfig::new(Strategy::Lexical).with_exact_code_match(true);
        let resolver = Resolver::new(&set, &index, &config);
        let items = vec![
            Item::new("X1", "muro de bloque de hormigon", None),
            Item::new("P01", "", None),
            Item::new("X2", "ascensor", None),
        ];
        let res = resolver.resolve_all(&items).unwrap();
        assert_eq!(res[0].matched_code.as_deref(), Some("P02"));
        assert_eq!(res[1].matched_code.as_deref(), Some("P01"));
        assert_eq!(res[2].assigned_price, AssignedPrice::NotFound);

        let single: Vec<Resolution> = items.iter().map(|i| resolver.resolve(i).unwrap()).collect();
        assert_eq!(res, single);
    }

    #[test]
    fn test_sentinel_serialization() {
        assert_eq!(serde_json::to_string(&AssignedPrice::NotFound).unwrap(), "\"not found\"");
        assert_eq!(serde_json::to_string(&AssignedPrice::Price(12.5)).unwrap(), "12.5");
        assert_eq!(AssignedPrice::NotFound.to_string(), "not found");
    }
}
