//! Learner identity from session credentials.
//!
//! Tokens are JWTs. Only the payload is read; verifying the signature is the
//! remote directory's job.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use practice_core::model::{AuthToken, LearnerContext, LearnerId};
use serde_json::Value;

/// Claims checked for the learner id, in priority order.
const LEARNER_CLAIMS: [&str; 3] = ["user_id", "id", "sub"];

/// Builds the session context for `token`.
///
/// A missing or unreadable token yields an anonymous context. A readable token
/// without a learner claim keeps the token but stays anonymous.
#[must_use]
pub fn resolve_context(token: Option<AuthToken>) -> LearnerContext {
    let learner = token.as_ref().and_then(learner_from_token);
    if token.is_some() && learner.is_none() {
        tracing::warn!("session token carries no learner id; continuing anonymously");
    }
    LearnerContext::new(learner, token)
}

#[must_use]
pub fn learner_from_token(token: &AuthToken) -> Option<LearnerId> {
    let payload = token.as_str().split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    LEARNER_CLAIMS
        .iter()
        .find_map(|claim| claims.get(*claim).and_then(claim_id))
        .map(LearnerId::new)
}

fn claim_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jwt(claims: &Value) -> AuthToken {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        AuthToken::new(format!("{header}.{payload}.signature")).unwrap()
    }

    #[test]
    fn prefers_user_id_claim() {
        let token = jwt(&json!({ "user_id": 7, "id": 8, "sub": "9" }));
        assert_eq!(learner_from_token(&token), Some(LearnerId::new(7)));
    }

    #[test]
    fn falls_back_to_numeric_sub() {
        let token = jwt(&json!({ "sub": "42", "exp": 1 }));
        assert_eq!(learner_from_token(&token), Some(LearnerId::new(42)));
    }

    #[test]
    fn non_numeric_claims_are_anonymous() {
        let token = jwt(&json!({ "sub": "alice" }));
        let ctx = resolve_context(Some(token));
        assert!(ctx.is_anonymous());
        assert!(ctx.token().is_some());
    }

    #[test]
    fn garbage_and_missing_tokens_are_anonymous() {
        assert!(resolve_context(None).is_anonymous());
        let garbage = AuthToken::new("not-a-jwt").unwrap();
        assert_eq!(learner_from_token(&garbage), None);
        let bad_payload = AuthToken::new("a.!!!.c").unwrap();
        assert_eq!(learner_from_token(&bad_payload), None);
    }

    #[test]
    fn resolved_context_carries_learner_and_token() {
        let ctx = resolve_context(Some(jwt(&json!({ "id": 3 }))));
        assert_eq!(ctx.learner(), Some(LearnerId::new(3)));
        assert!(!ctx.is_anonymous());
    }
}
