//! Token payload decoding.

use crate::{TokenError, TokenResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Decoded token payload.
///
/// Only the claims the session layer acts on are modeled; anything else in
/// the payload is ignored. Decoding performs no signature verification —
/// the server remains the authority, this is purely for client-side expiry
/// bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Expiry instant (seconds since the epoch).
    pub exp: i64,
    /// Issued-at instant.
    #[serde(default)]
    pub iat: Option<i64>,
    /// Subject (user id).
    #[serde(default)]
    pub sub: Option<String>,
}

/// Decode the payload segment of a bearer token.
///
/// Fails with `TokenError` on any malformed input; callers must not crash on
/// this failure.
pub fn decode(token: &str) -> TokenResult<Claims> {
    let mut segments = token.split('.');
    let payload = match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(_header), Some(payload), Some(_signature), None) => payload,
        _ => return Err(TokenError::Malformed),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| TokenError::Encoding(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| TokenError::Payload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::make_token;
    use serde_json::json;

    #[test]
    fn test_decode_valid_token() {
        let token = make_token(&json!({"exp": 1_700_000_000, "sub": "user-1"}));
        let claims = decode(&token).unwrap();
        assert_eq!(claims.exp, 1_700_000_000);
        assert_eq!(claims.sub.as_deref(), Some("user-1"));
        assert_eq!(claims.iat, None);
    }

    #[test]
    fn test_decode_wrong_segment_count_is_malformed() {
        assert!(matches!(decode("justone"), Err(TokenError::Malformed)));
        assert!(matches!(decode("two.parts"), Err(TokenError::Malformed)));
        assert!(matches!(
            decode("a.b.c.d"),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(decode(""), Err(TokenError::Malformed)));
    }

    #[test]
    fn test_decode_bad_base64_is_encoding_error() {
        let result = decode("header.!!!not-base64!!!.signature");
        assert!(matches!(result, Err(TokenError::Encoding(_))));
    }

    #[test]
    fn test_decode_bad_json_is_payload_error() {
        let body = URL_SAFE_NO_PAD.encode(b"not json at all");
        let token = format!("header.{body}.signature");
        assert!(matches!(decode(&token), Err(TokenError::Payload(_))));
    }

    #[test]
    fn test_decode_missing_exp_is_payload_error() {
        let token = make_token(&json!({"sub": "user-1"}));
        assert!(matches!(decode(&token), Err(TokenError::Payload(_))));
    }

    #[test]
    fn test_decode_only_ever_fails_with_token_error() {
        // A grab bag of junk inputs; every failure must be a TokenError.
        for input in ["", ".", "..", "a..b", "💥.💥.💥", "a.b.c.d.e"] {
            let result = decode(input);
            assert!(result.is_err(), "expected failure for {input:?}");
        }
    }
}
