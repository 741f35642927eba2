use crate::normalize::normalize_text;
use serde::{Deserialize, Serialize};

/// A budget line item ("partida") rebuilt from one or two source rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub code: String,
    /// Title and description joined by one space, trimmed
    pub raw_text: String,
    /// Comparison form of `raw_text`
    pub normalized_text: String,
    /// Known price; only reference items carry one
    pub price: Option<f64>,
}

impl Item {
    pub fn new(code: impl Into<String>, raw_text: impl Into<String>, price: Option<f64>) -> Self {
        let raw_text = raw_text.into();
        let normalized_text = normalize_text(&raw_text);
        Self {
            code: code.into(),
            raw_text,
            normalized_text,
            price,
        }
    }

    /// Usable as a reference: priced and with something to compare against
    #[inline]
    pub fn is_usable_reference(&self) -> bool {
        self.price.is_some() && !self.normalized_text.is_empty()
    }
}

/// Join a title fragment and a description fragment
pub(crate) fn combine_text(title: &str, description: &str) -> String {
    format!("{} {}", title, description).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_text() {
        assert_eq!(combine_text("Excavación", "en terreno suelto"), "Excavación en terreno suelto");
        assert_eq!(combine_text("Excavación", ""), "Excavación");
        assert_eq!(combine_text("", "solo descripción"), "solo descripción");
        assert_eq!(combine_text("", ""), "");
    }

    #[test]
    fn test_usable_reference() {
        assert!(Item::new("P01", "Muro", Some(10.0)).is_usable_reference());
        assert!(!Item::new("P02", "Muro", None).is_usable_reference());
        assert!(!Item::new("P03", " ¿? ", Some(10.0)).is_usable_reference());
    }
}
