use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ServerError;
use crate::state::AppState;

/// Authenticated caller identity, extracted from the `X-API-Key` header.
/// Used only for audit `actor_id`; the business `agent_id` a request governs
/// is always supplied in the request body.
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub String);

impl FromRequestParts<AppState> for CallerIdentity {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let raw_key = parts
            .headers
            .get("X-API-Key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        if state.config.auth_disabled {
            return Ok(Self(raw_key.unwrap_or_else(|| "anonymous".to_owned())));
        }

        let raw_key = raw_key.ok_or_else(|| ServerError::Unauthorized("missing X-API-Key".to_owned()))?;
        state
            .config
            .api_keys
            .get(&raw_key)
            .map(|agent_id| Self(agent_id.to_string()))
            .ok_or_else(|| ServerError::Unauthorized("invalid API key".to_owned()))
    }
}
