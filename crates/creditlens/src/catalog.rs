//! Feature catalog and client registry, loaded once per session.

use std::collections::{HashMap, HashSet};

use crate::types::{ClientId, CreditError, CreditResult, FeatureKind, LayoutHint};

/// Immutable catalog of model features.
///
/// Holds the canonical feature ordering plus the categorical/numeric
/// classification. Cache keys for single-feature and bivariate artifacts
/// encode positions in `all`, not names, so the key space stays stable even
/// if display names change case or locale.
#[derive(Debug, Clone)]
pub struct FeatureCatalog {
    all: Vec<String>,
    categorical: HashSet<String>,
    numeric: HashSet<String>,
    index: HashMap<String, usize>,
}

impl FeatureCatalog {
    /// Build a catalog, validating its invariants: the classified sets must
    /// be disjoint and both contained in `all`.
    pub fn new(
        all: Vec<String>,
        categorical: Vec<String>,
        numeric: Vec<String>,
    ) -> CreditResult<Self> {
        let index: HashMap<String, usize> = all
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        let categorical: HashSet<String> = categorical.into_iter().collect();
        let numeric: HashSet<String> = numeric.into_iter().collect();

        if let Some(dup) = categorical.intersection(&numeric).next() {
            return Err(CreditError::Catalog(format!(
                "feature classified as both categorical and numeric: {dup}"
            )));
        }
        for name in categorical.iter().chain(numeric.iter()) {
            if !index.contains_key(name) {
                return Err(CreditError::Catalog(format!(
                    "classified feature missing from the full list: {name}"
                )));
            }
        }

        Ok(Self {
            all,
            categorical,
            numeric,
            index,
        })
    }

    /// All feature names in canonical order.
    pub fn all(&self) -> &[String] {
        &self.all
    }

    /// Position of a feature in the canonical ordering.
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Whether the catalog knows this feature.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.all.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Classify a feature by membership in the categorical/numeric sets.
    pub fn classify(&self, name: &str) -> FeatureKind {
        if self.categorical.contains(name) {
            FeatureKind::Categorical
        } else if self.numeric.contains(name) {
            FeatureKind::Numeric
        } else {
            FeatureKind::Unknown
        }
    }

    /// Display-size hint for a bivariate pair.
    ///
    /// `Large` exactly when one feature is categorical and the other numeric.
    /// Pairs involving an unclassified feature render normal.
    pub fn bivariate_layout_hint(&self, feature_a: &str, feature_b: &str) -> LayoutHint {
        match (self.classify(feature_a), self.classify(feature_b)) {
            (FeatureKind::Categorical, FeatureKind::Numeric)
            | (FeatureKind::Numeric, FeatureKind::Categorical) => LayoutHint::Large,
            _ => LayoutHint::Normal,
        }
    }
}

/// Ordered list of valid client identifiers, fetched once at startup.
#[derive(Debug, Clone)]
pub struct ClientIdRegistry {
    ids: Vec<ClientId>,
}

impl ClientIdRegistry {
    pub fn new(ids: Vec<ClientId>) -> Self {
        Self { ids }
    }

    /// Identifiers in the order the service returned them.
    pub fn ids(&self) -> &[ClientId] {
        &self.ids
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> FeatureCatalog {
        FeatureCatalog::new(
            vec![
                "AGE".to_string(),
                "EDUCATION".to_string(),
                "INCOME".to_string(),
                "OCCUPATION".to_string(),
            ],
            vec!["EDUCATION".to_string(), "OCCUPATION".to_string()],
            vec!["AGE".to_string(), "INCOME".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_index_follows_declaration_order() {
        let cat = catalog();
        assert_eq!(cat.feature_index("AGE"), Some(0));
        assert_eq!(cat.feature_index("OCCUPATION"), Some(3));
        assert_eq!(cat.feature_index("MISSING"), None);
    }

    #[test]
    fn test_classify() {
        let cat = catalog();
        assert_eq!(cat.classify("EDUCATION"), FeatureKind::Categorical);
        assert_eq!(cat.classify("AGE"), FeatureKind::Numeric);
        assert_eq!(cat.classify("MISSING"), FeatureKind::Unknown);
    }

    #[test]
    fn test_layout_hint_truth_table() {
        let cat = catalog();
        // Mixed pairing, either order
        assert_eq!(
            cat.bivariate_layout_hint("EDUCATION", "AGE"),
            LayoutHint::Large
        );
        assert_eq!(
            cat.bivariate_layout_hint("AGE", "EDUCATION"),
            LayoutHint::Large
        );
        // Same kind
        assert_eq!(
            cat.bivariate_layout_hint("AGE", "INCOME"),
            LayoutHint::Normal
        );
        assert_eq!(
            cat.bivariate_layout_hint("EDUCATION", "OCCUPATION"),
            LayoutHint::Normal
        );
        // Unknown on either side
        assert_eq!(
            cat.bivariate_layout_hint("MISSING", "AGE"),
            LayoutHint::Normal
        );
        assert_eq!(cat.bivariate_layout_hint("AGE", "AGE"), LayoutHint::Normal);
    }

    #[test]
    fn test_rejects_overlapping_classification() {
        let err = FeatureCatalog::new(
            vec!["AGE".to_string()],
            vec!["AGE".to_string()],
            vec!["AGE".to_string()],
        )
        .unwrap_err();
        assert!(matches!(err, CreditError::Catalog(_)));
    }

    #[test]
    fn test_rejects_classified_feature_outside_all() {
        let err = FeatureCatalog::new(
            vec!["AGE".to_string()],
            vec!["EDUCATION".to_string()],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, CreditError::Catalog(_)));
    }

    #[test]
    fn test_registry_lookup() {
        let reg = ClientIdRegistry::new(vec![100001, 100002]);
        assert!(reg.contains(100002));
        assert!(!reg.contains(42));
        assert_eq!(reg.ids(), &[100001, 100002]);
    }
}
