//! Artifact requests and deterministic cache-key derivation.
//!
//! Key derivation is pure: the same request against the same catalog always
//! produces the same key string. File names stay byte-compatible with
//! scratch directories written by earlier dashboard deployments, so an
//! existing cache remains readable.

use std::fmt;

use crate::catalog::FeatureCatalog;
use crate::types::{ClientId, CreditError, CreditResult};

/// Inclusive bounds on the `max_features` request parameter.
///
/// Defaults mirror the dashboard sliders (5 to 30 features).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureBounds {
    pub min: u32,
    pub max: u32,
}

impl Default for FeatureBounds {
    fn default() -> Self {
        Self { min: 5, max: 30 }
    }
}

impl FeatureBounds {
    fn contains(&self, n: u32) -> bool {
        n >= self.min && n <= self.max
    }
}

/// A logical request for one dashboard artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactRequest {
    /// Population-wide feature-impact image.
    GlobalImpact { max_features: u32 },
    /// Client-specific feature-impact image.
    LocalImpact {
        client_id: ClientId,
        max_features: u32,
    },
    /// Scatter of one feature's impact across the population.
    SingleFeature {
        client_id: ClientId,
        feature: String,
    },
    /// Relationship between two distinct features.
    BivariatePair {
        feature_a: String,
        feature_b: String,
    },
    /// Gauge scalar. Cheap, live, never cached to disk.
    Gauge { client_id: ClientId },
}

impl ArtifactRequest {
    /// Reject invalid parameters before any key derivation or network call.
    pub fn validate(&self, catalog: &FeatureCatalog, bounds: &FeatureBounds) -> CreditResult<()> {
        match self {
            ArtifactRequest::GlobalImpact { max_features }
            | ArtifactRequest::LocalImpact { max_features, .. } => {
                if !bounds.contains(*max_features) {
                    return Err(CreditError::InvalidParameter(format!(
                        "max_features {} outside allowed range {}..={}",
                        max_features, bounds.min, bounds.max
                    )));
                }
                Ok(())
            }
            ArtifactRequest::SingleFeature { feature, .. } => {
                require_known(catalog, feature)?;
                Ok(())
            }
            ArtifactRequest::BivariatePair {
                feature_a,
                feature_b,
            } => {
                if feature_a == feature_b {
                    return Err(CreditError::InvalidParameter(format!(
                        "bivariate analysis needs two distinct features, got {feature_a} twice"
                    )));
                }
                require_known(catalog, feature_a)?;
                require_known(catalog, feature_b)?;
                Ok(())
            }
            ArtifactRequest::Gauge { .. } => Ok(()),
        }
    }

    /// Derive the storage keys for this request.
    ///
    /// Returns `Ok(None)` for gauge requests, which bypass the store. For
    /// bivariate pairs the primary key uses the as-given feature order and
    /// the alternate probes the reverse order, since a prior session may
    /// have stored the same semantic artifact under either.
    pub fn cache_keys(&self, catalog: &FeatureCatalog) -> CreditResult<Option<DerivedKeys>> {
        let keys = match self {
            ArtifactRequest::GlobalImpact { max_features } => {
                DerivedKeys::single(CacheKey(format!("gfgi_{max_features}.png")))
            }
            ArtifactRequest::LocalImpact {
                client_id,
                max_features,
            } => DerivedKeys::single(CacheKey(format!("gfli_{client_id}_{max_features}.png"))),
            ArtifactRequest::SingleFeature { client_id, feature } => {
                let idx = require_known(catalog, feature)?;
                DerivedKeys::single(CacheKey(format!("feature_{client_id}_{idx}.png")))
            }
            ArtifactRequest::BivariatePair {
                feature_a,
                feature_b,
            } => {
                let ia = require_known(catalog, feature_a)?;
                let ib = require_known(catalog, feature_b)?;
                DerivedKeys {
                    primary: CacheKey(format!("bivar{ia}_{ib}.png")),
                    alternates: vec![CacheKey(format!("bivar{ib}_{ia}.png"))],
                    lock_token: format!("bivar{}_{}", ia.min(ib), ia.max(ib)),
                }
            }
            ArtifactRequest::Gauge { .. } => return Ok(None),
        };
        Ok(Some(keys))
    }
}

fn require_known(catalog: &FeatureCatalog, feature: &str) -> CreditResult<usize> {
    catalog
        .feature_index(feature)
        .ok_or_else(|| CreditError::UnknownFeature(feature.to_string()))
}

/// Deterministic string identifying one artifact's storage slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Candidate storage keys for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedKeys {
    /// Key used for a fresh write.
    pub primary: CacheKey,
    /// Equivalent keys a prior session may have written. Probed on lookup,
    /// never re-keyed to the primary.
    pub alternates: Vec<CacheKey>,
    /// Order-independent token for in-process mutual exclusion, so both
    /// orderings of a symmetric request serialize on the same lock.
    pub lock_token: String,
}

impl DerivedKeys {
    fn single(primary: CacheKey) -> Self {
        let lock_token = primary.as_str().to_string();
        Self {
            primary,
            alternates: Vec::new(),
            lock_token,
        }
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
            ],
            vec!["EDUCATION".to_string()],
            vec!["AGE".to_string(), "INCOME".to_string()],
        )
        .unwrap()
    }

    fn keys(req: &ArtifactRequest) -> DerivedKeys {
        req.cache_keys(&catalog()).unwrap().unwrap()
    }

    #[test]
    fn test_key_shapes() {
        assert_eq!(
            keys(&ArtifactRequest::GlobalImpact { max_features: 20 })
                .primary
                .as_str(),
            "gfgi_20.png"
        );
        assert_eq!(
            keys(&ArtifactRequest::LocalImpact {
                client_id: 100001,
                max_features: 16
            })
            .primary
            .as_str(),
            "gfli_100001_16.png"
        );
        assert_eq!(
            keys(&ArtifactRequest::SingleFeature {
                client_id: 100001,
                feature: "INCOME".to_string()
            })
            .primary
            .as_str(),
            "feature_100001_2.png"
        );
    }

    #[test]
    fn test_key_derivation_is_deterministic() {
        let req = ArtifactRequest::BivariatePair {
            feature_a: "EDUCATION".to_string(),
            feature_b: "AGE".to_string(),
        };
        assert_eq!(keys(&req), keys(&req));
    }

    #[test]
    fn test_bivariate_alternate_is_reverse_order() {
        let derived = keys(&ArtifactRequest::BivariatePair {
            feature_a: "EDUCATION".to_string(),
            feature_b: "AGE".to_string(),
        });
        assert_eq!(derived.primary.as_str(), "bivar1_0.png");
        assert_eq!(derived.alternates.len(), 1);
        assert_eq!(derived.alternates[0].as_str(), "bivar0_1.png");
    }

    #[test]
    fn test_symmetric_pairs_share_a_lock_token() {
        let ab = keys(&ArtifactRequest::BivariatePair {
            feature_a: "EDUCATION".to_string(),
            feature_b: "AGE".to_string(),
        });
        let ba = keys(&ArtifactRequest::BivariatePair {
            feature_a: "AGE".to_string(),
            feature_b: "EDUCATION".to_string(),
        });
        assert_ne!(ab.primary, ba.primary);
        assert_eq!(ab.lock_token, ba.lock_token);
    }

    #[test]
    fn test_gauge_has_no_cache_key() {
        let req = ArtifactRequest::Gauge { client_id: 100001 };
        assert!(req.cache_keys(&catalog()).unwrap().is_none());
    }

    #[test]
    fn test_unknown_feature_rejected() {
        let req = ArtifactRequest::SingleFeature {
            client_id: 100001,
            feature: "NOT_A_FEATURE".to_string(),
        };
        assert!(matches!(
            req.cache_keys(&catalog()),
            Err(CreditError::UnknownFeature(_))
        ));
        assert!(matches!(
            req.validate(&catalog(), &FeatureBounds::default()),
            Err(CreditError::UnknownFeature(_))
        ));
    }

    #[test]
    fn test_max_features_bounds() {
        let cat = catalog();
        let bounds = FeatureBounds::default();
        let low = ArtifactRequest::GlobalImpact { max_features: 3 };
        let high = ArtifactRequest::LocalImpact {
            client_id: 1,
            max_features: 31,
        };
        let ok = ArtifactRequest::GlobalImpact { max_features: 5 };
        assert!(matches!(
            low.validate(&cat, &bounds),
            Err(CreditError::InvalidParameter(_))
        ));
        assert!(matches!(
            high.validate(&cat, &bounds),
            Err(CreditError::InvalidParameter(_))
        ));
        assert!(ok.validate(&cat, &bounds).is_ok());
    }

    #[test]
    fn test_identical_pair_rejected() {
        let req = ArtifactRequest::BivariatePair {
            feature_a: "AGE".to_string(),
            feature_b: "AGE".to_string(),
        };
        assert!(matches!(
            req.validate(&catalog(), &FeatureBounds::default()),
            Err(CreditError::InvalidParameter(_))
        ));
    }
}
