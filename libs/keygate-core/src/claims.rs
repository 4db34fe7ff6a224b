use std::collections::BTreeMap;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::{Map, Number, Value};

use crate::TokenError;

/// A single claim value as it arrived on the wire.
///
/// JSON numbers carry no fixed width, so identifiers and timestamps are kept
/// as a [`Number`] and coerced on demand.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<ClaimValue>),
    Object(BTreeMap<String, ClaimValue>),
}

impl ClaimValue {
    /// Integral value of a numeric claim.
    ///
    /// Accepts `42` and `42.0`; rejects `42.5`, out-of-range numbers and
    /// every non-numeric variant.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).and_then(f64_to_i64)),
            _ => None,
        }
    }

    /// Numeric claim truncated toward zero (`1700000000.9` becomes `1700000000`).
    pub fn as_truncated_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(f64_to_i64)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ClaimValue]> {
        match self {
            Self::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

fn f64_to_i64(f: f64) -> Option<i64> {
    // i64::MAX is not representable as f64; the cast rounds up to 2^63.
    if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f.trunc() as i64)
    } else {
        None
    }
}

impl From<Value> for ClaimValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
        }
    }
}

/// The claims set of a token: claim name to loosely typed value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claims(BTreeMap<String, ClaimValue>);

impl Claims {
    pub fn get(&self, name: &str) -> Option<&ClaimValue> {
        self.0.get(name)
    }

    /// User id from `sub`.
    pub fn subject(&self) -> Result<i64, TokenError> {
        self.get("sub")
            .and_then(ClaimValue::as_i64)
            .ok_or(TokenError::MissingClaim("sub"))
    }

    /// Issue time from `iat`, truncated to whole seconds.
    pub fn issued_at(&self) -> Result<i64, TokenError> {
        self.get("iat")
            .and_then(ClaimValue::as_truncated_i64)
            .ok_or(TokenError::MissingClaim("iat"))
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(
            map.into_iter()
                .map(|(k, v)| (k, ClaimValue::from(v)))
                .collect(),
        )
    }
}

/// The fields of the JOSE header that verification looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHeader {
    /// Raw `alg` value; not yet checked against the allow-list.
    pub algorithm: String,
}

/// A structurally valid token whose signature has NOT been checked.
///
/// Only `sub` and `iat` may be read from here, and only to locate key
/// material. Everything else must come from the verified claims.
#[derive(Debug, Clone)]
pub struct UnverifiedToken {
    pub header: TokenHeader,
    pub claims: Claims,
}

/// Decodes header and payload without verifying the signature.
///
/// Fails with `MalformedToken` unless the input has exactly three base64url
/// segments, the header is a JSON object with a string `alg` and well-typed
/// optional fields, and the payload is a JSON object.
pub fn peek(token: &str) -> Result<UnverifiedToken, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [header, payload, signature] = segments.as_slice() else {
        return Err(TokenError::MalformedToken(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    };

    let header = decode_object(header, "header")?;
    let payload = decode_object(payload, "payload")?;
    URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|e| TokenError::MalformedToken(format!("signature is not base64url: {e}")))?;

    let algorithm = header
        .get("alg")
        .and_then(Value::as_str)
        .ok_or_else(|| TokenError::MalformedToken("header has no alg".into()))?
        .to_string();
    check_header_fields(&header)?;

    Ok(UnverifiedToken {
        header: TokenHeader { algorithm },
        claims: Claims::from(payload),
    })
}

/// Optional JOSE header parameters that must be strings when present.
const STRING_HEADER_FIELDS: [&str; 7] = ["typ", "cty", "jku", "kid", "x5u", "x5t", "x5t#S256"];

fn check_header_fields(header: &Map<String, Value>) -> Result<(), TokenError> {
    let mistyped = |name: &str| TokenError::MalformedToken(format!("header {name} has the wrong type"));

    for name in STRING_HEADER_FIELDS {
        match header.get(name) {
            None | Some(Value::Null | Value::String(_)) => {}
            Some(_) => return Err(mistyped(name)),
        }
    }

    match header.get("x5c") {
        None | Some(Value::Null) => {}
        Some(Value::Array(chain)) if chain.iter().all(Value::is_string) => {}
        Some(_) => return Err(mistyped("x5c")),
    }

    match header.get("jwk") {
        None | Some(Value::Null | Value::Object(_)) => Ok(()),
        Some(_) => Err(mistyped("jwk")),
    }
}

fn decode_object(segment: &str, part: &str) -> Result<Map<String, Value>, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenError::MalformedToken(format!("{part} is not base64url: {e}")))?;
    serde_json::from_slice::<Map<String, Value>>(&bytes)
        .map_err(|e| TokenError::MalformedToken(format!("{part} is not a JSON object: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segment(value: &Value) -> String {
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(value).unwrap())
    }

    fn token_with(payload: Value) -> String {
        format!(
            "{}.{}.{}",
            segment(&json!({ "alg": "HS256", "typ": "JWT" })),
            segment(&payload),
            URL_SAFE_NO_PAD.encode(b"sig")
        )
    }

    #[test]
    fn test_peek_reads_header_and_claims() {
        let token = token_with(json!({ "sub": 42, "iat": 1700000000, "iss": "Local" }));

        let peeked = peek(&token).unwrap();

        assert_eq!(peeked.header.algorithm, "HS256");
        assert_eq!(peeked.claims.subject().unwrap(), 42);
        assert_eq!(peeked.claims.issued_at().unwrap(), 1700000000);
        assert_eq!(peeked.claims.get("iss").and_then(ClaimValue::as_str), Some("Local"));
    }

    #[test]
    fn test_peek_rejects_wrong_segment_count() {
        for token in ["", "a", "a.b", "a.b.c.d", "eyJ.eyJ.sig.extra.more"] {
            assert!(
                matches!(peek(token), Err(TokenError::MalformedToken(_))),
                "{token:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_peek_rejects_non_base64_segments() {
        let valid = token_with(json!({ "sub": 1, "iat": 1 }));
        let parts: Vec<&str> = valid.split('.').collect();

        let bad_header = format!("!!!.{}.{}", parts[1], parts[2]);
        let bad_payload = format!("{}.%%%.{}", parts[0], parts[2]);
        let bad_signature = format!("{}.{}.***", parts[0], parts[1]);

        for token in [bad_header, bad_payload, bad_signature] {
            assert!(matches!(peek(&token), Err(TokenError::MalformedToken(_))));
        }
    }

    #[test]
    fn test_peek_rejects_non_object_payload() {
        let token = format!(
            "{}.{}.{}",
            segment(&json!({ "alg": "HS256" })),
            segment(&json!([1, 2, 3])),
            URL_SAFE_NO_PAD.encode(b"sig")
        );

        assert!(matches!(peek(&token), Err(TokenError::MalformedToken(_))));
    }

    #[test]
    fn test_peek_rejects_header_without_alg() {
        let token = format!(
            "{}.{}.{}",
            segment(&json!({ "typ": "JWT" })),
            segment(&json!({ "sub": 1, "iat": 1 })),
            URL_SAFE_NO_PAD.encode(b"sig")
        );

        assert!(matches!(peek(&token), Err(TokenError::MalformedToken(_))));
    }

    #[test]
    fn test_peek_rejects_mistyped_header_fields() {
        let payload = json!({ "sub": 1, "iat": 1 });
        let sig = URL_SAFE_NO_PAD.encode(b"sig");

        for header in [
            json!({ "alg": "HS256", "typ": 5 }),
            json!({ "alg": "HS256", "kid": { "id": 1 } }),
            json!({ "alg": "HS256", "x5t#S256": false }),
            json!({ "alg": "HS256", "x5c": "chain" }),
            json!({ "alg": "HS256", "jwk": [] }),
        ] {
            let token = format!("{}.{}.{sig}", segment(&header), segment(&payload));
            assert!(
                matches!(peek(&token), Err(TokenError::MalformedToken(_))),
                "{header}"
            );
        }
    }

    #[test]
    fn test_peek_accepts_string_and_null_header_fields() {
        let header = json!({ "alg": "HS256", "typ": "JWT", "kid": "k1", "cty": null, "x5c": ["a"] });
        let token = format!(
            "{}.{}.{}",
            segment(&header),
            segment(&json!({ "sub": 1, "iat": 1 })),
            URL_SAFE_NO_PAD.encode(b"sig")
        );

        assert_eq!(peek(&token).unwrap().header.algorithm, "HS256");
    }

    #[test]
    fn test_subject_accepts_integral_float() {
        let peeked = peek(&token_with(json!({ "sub": 42.0, "iat": 1 }))).unwrap();
        assert_eq!(peeked.claims.subject().unwrap(), 42);
    }

    #[test]
    fn test_subject_rejects_string_and_fraction() {
        let as_string = peek(&token_with(json!({ "sub": "42", "iat": 1 }))).unwrap();
        let as_fraction = peek(&token_with(json!({ "sub": 42.5, "iat": 1 }))).unwrap();
        let missing = peek(&token_with(json!({ "iat": 1 }))).unwrap();

        for peeked in [as_string, as_fraction, missing] {
            assert!(matches!(
                peeked.claims.subject(),
                Err(TokenError::MissingClaim("sub"))
            ));
        }
    }

    #[test]
    fn test_issued_at_truncates_float() {
        let peeked = peek(&token_with(json!({ "sub": 1, "iat": 1700000000.9 }))).unwrap();
        assert_eq!(peeked.claims.issued_at().unwrap(), 1700000000);
    }

    #[test]
    fn test_issued_at_rejects_non_numeric() {
        let peeked = peek(&token_with(json!({ "sub": 1, "iat": "yesterday" }))).unwrap();
        assert!(matches!(
            peeked.claims.issued_at(),
            Err(TokenError::MissingClaim("iat"))
        ));
    }

    #[test]
    fn test_claim_value_coercions() {
        assert_eq!(ClaimValue::from(json!(7)).as_i64(), Some(7));
        assert_eq!(ClaimValue::from(json!(-3.0)).as_i64(), Some(-3));
        assert_eq!(ClaimValue::from(json!(u64::MAX)).as_i64(), None);
        assert_eq!(ClaimValue::from(json!(1e300)).as_truncated_i64(), None);
        assert_eq!(ClaimValue::from(json!(true)).as_i64(), None);
        assert_eq!(ClaimValue::from(json!("aud")).as_str(), Some("aud"));
        assert_eq!(
            ClaimValue::from(json!(["a", "b"])).as_array().map(<[_]>::len),
            Some(2)
        );
    }
}
