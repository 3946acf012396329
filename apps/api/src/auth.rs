use jsonwebtoken::{DecodingKey, Validation, decode};
use palisade_core::{AppError, IdentityClaims};
use serde_json::{Map, Value};

/// Verifies HS256 bearer tokens issued by the identity provider.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    /// Verifies signature and expiry and returns the token's scalar claims.
    pub fn verify(&self, token: &str) -> Result<IdentityClaims, AppError> {
        let token_data = decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation)
            .map_err(|error| {
                AppError::AuthenticationRequired(format!("invalid bearer token: {error}"))
            })?;

        Ok(claims_from_payload(token_data.claims))
    }
}

/// Keeps string, number and boolean claims. Arrays and objects are dropped.
fn claims_from_payload(payload: Map<String, Value>) -> IdentityClaims {
    IdentityClaims::from_pairs(payload.into_iter().filter_map(|(name, value)| {
        let value = match value {
            Value::String(value) => value,
            Value::Number(value) => value.to_string(),
            Value::Bool(value) => value.to_string(),
            Value::Null | Value::Array(_) | Value::Object(_) => return None,
        };
        Some((name, value))
    }))
}
