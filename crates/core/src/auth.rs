use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Name of the stable subject claim issued by the identity provider.
pub const SUBJECT_CLAIM: &str = "sub";

/// Verified claim set attached to an authenticated request.
///
/// Instances only exist for requests whose token was verified upstream, so the
/// presence of claims is what marks a request as authenticated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    claims: BTreeMap<String, String>,
}

impl IdentityClaims {
    /// Creates a claim set from verified name/value pairs.
    #[must_use]
    pub fn new(claims: BTreeMap<String, String>) -> Self {
        Self { claims }
    }

    /// Builds a claim set from an iterator of name/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            claims: pairs
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }

    /// Returns a claim value by name. Blank values are treated as absent.
    #[must_use]
    pub fn find_claim(&self, name: &str) -> Option<&str> {
        self.claims
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Returns the stable subject claim from the identity provider.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.find_claim(SUBJECT_CLAIM)
    }
}
