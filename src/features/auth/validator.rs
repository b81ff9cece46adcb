use super::model::TokenIdentity;
use crate::core::error::AppError;
use crate::features::users::models::UserRole;
use crate::shared::constants::{MAX_LOCATION_CHARS, MAX_USERNAME_CHARS};
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::jwks::JwksClient;

pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,
    issuer: String,
    audience: String,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    preferred_username: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
}

impl Claims {
    fn into_identity(self) -> TokenIdentity {
        let username = self
            .preferred_username
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| self.sub.clone());
        let location = self
            .location
            .map(|l| truncate_chars(l.trim(), MAX_LOCATION_CHARS).trim_end().to_string())
            .filter(|l| !l.is_empty());

        TokenIdentity {
            role: UserRole::from_claims(&self.roles),
            external_id: self.sub,
            username: truncate_chars(&username, MAX_USERNAME_CHARS).to_string(),
            location,
        }
    }
}

/// Longest prefix of `s` holding at most `max` characters
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

impl JwtValidator {
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: String,
        leeway: Duration,
    ) -> Self {
        Self {
            jwks_client,
            issuer,
            audience,
            leeway: leeway.as_secs(),
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<TokenIdentity, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only RS256 is allowed",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AppError::Auth("Missing kid in token header".to_string()))?;

        let decoding_key = self
            .jwks_client
            .get_key(&kid)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?;

        Ok(token_data.claims.into_identity())
    }
}
