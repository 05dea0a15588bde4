//! Request introspection for the echo handler.
//!
//! # Responsibilities
//! - Capture headers, form fields and connection metadata as JSON
//! - Decode the header and payload of a bearer token, when one is present
//!
//! # Design Decisions
//! - Header names are reported in canonical MIME form (`User-Agent`)
//! - A malformed bearer token is logged and left out, never a failure

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::http::{header, request::Parts, HeaderMap, Method};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Serialize;
use serde_json::{Map, Value};

const BEARER_PREFIX: &str = "Bearer ";

/// Everything the echo handler reports back to the client.
#[derive(Debug, Serialize)]
pub struct EchoReport {
    #[serde(rename = "Header")]
    pub header: BTreeMap<String, Vec<String>>,
    #[serde(rename = "Form")]
    pub form: BTreeMap<String, Vec<String>>,
    #[serde(rename = "Proto")]
    pub proto: String,
    #[serde(rename = "Method")]
    pub method: String,
    #[serde(rename = "Host")]
    pub host: String,
    #[serde(rename = "RequestURI")]
    pub request_uri: String,
    #[serde(rename = "RemoteAddr")]
    pub remote_addr: String,
    #[serde(rename = "Authorization")]
    pub authorization: AuthorizationInfo,
}

#[derive(Debug, Default, Serialize)]
pub struct AuthorizationInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt: Option<JwtInfo>,
}

/// Decoded (unverified) JWT segments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JwtInfo {
    pub header: Map<String, Value>,
    pub payload: Map<String, Value>,
}

/// Error decoding one token segment.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid base64url segment: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("segment is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),
}

impl EchoReport {
    /// Build the report from request parts and the (possibly empty) body.
    pub fn new(parts: &Parts, remote: SocketAddr, body: &[u8]) -> Self {
        let body_fields = if is_form_submission(&parts.method, &parts.headers) {
            body
        } else {
            &[]
        };

        let authorization = AuthorizationInfo {
            jwt: parts
                .headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(decode_bearer),
        };

        Self {
            header: canonical_headers(&parts.headers),
            form: form_fields(parts.uri.query(), body_fields),
            proto: format!("{:?}", parts.version),
            method: parts.method.to_string(),
            host: request_host(parts),
            request_uri: parts
                .uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| "/".to_string()),
            remote_addr: remote.to_string(),
            authorization,
        }
    }

    /// Serialize as JSON indented with four spaces.
    pub fn to_pretty_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut out = Vec::with_capacity(512);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(out)
    }
}

/// Whether the body carries url-encoded form fields worth parsing.
pub fn is_form_submission(method: &Method, headers: &HeaderMap) -> bool {
    let has_body = matches!(*method, Method::POST | Method::PUT | Method::PATCH);
    let is_urlencoded = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
    has_body && is_urlencoded
}

/// Body fields first, then query fields, grouped by name.
pub fn form_fields(query: Option<&str>, body: &[u8]) -> BTreeMap<String, Vec<String>> {
    let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let query = query.unwrap_or_default().as_bytes();
    for (name, value) in url::form_urlencoded::parse(body).chain(url::form_urlencoded::parse(query)) {
        fields.entry(name.into_owned()).or_default().push(value.into_owned());
    }
    fields
}

/// Header map keyed by canonical name. `Host` is reported separately.
pub fn canonical_headers(headers: &HeaderMap) -> BTreeMap<String, Vec<String>> {
    let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        if name == header::HOST {
            continue;
        }
        out.entry(canonical_header_key(name.as_str()))
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    out
}

/// `x-request-id` → `X-Request-Id`.
pub fn canonical_header_key(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let mapped = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            mapped
        })
        .collect()
}

fn request_host(parts: &Parts) -> String {
    parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| parts.uri.authority().map(|a| a.to_string()))
        .unwrap_or_default()
}

/// Decode the header and payload of `Bearer <h>.<p>.<s>`.
///
/// Returns `None` for anything that is not a three-segment bearer token or
/// whose first two segments are not base64url-encoded JSON objects.
pub fn decode_bearer(authorization: &str) -> Option<JwtInfo> {
    if authorization.len() <= BEARER_PREFIX.len() {
        return None;
    }
    let token = authorization.strip_prefix(BEARER_PREFIX)?;
    let segments: Vec<&str> = token.split('.').collect();
    let [header, payload, _signature] = segments.as_slice() else {
        return None;
    };

    let decode = |segment: &str, name: &str| match decode_segment(segment) {
        Ok(map) => Some(map),
        Err(e) => {
            tracing::warn!(segment = name, error = %e, "Ignoring malformed bearer token");
            None
        }
    };

    Some(JwtInfo {
        header: decode(*header, "header")?,
        payload: decode(*payload, "payload")?,
    })
}

fn decode_segment(segment: &str) -> Result<Map<String, Value>, TokenError> {
    let bytes = URL_SAFE_NO_PAD.decode(segment)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use serde_json::json;

    fn encode(value: &Value) -> String {
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(value).unwrap())
    }

    #[test]
    fn canonicalizes_header_names() {
        assert_eq!(canonical_header_key("user-agent"), "User-Agent");
        assert_eq!(canonical_header_key("x-request-id"), "X-Request-Id");
        assert_eq!(canonical_header_key("accept"), "Accept");
    }

    #[test]
    fn decodes_valid_bearer_token() {
        let header = json!({"alg": "HS256", "typ": "JWT"});
        let payload = json!({"sub": "1234567890", "name": "John Doe", "iat": 1516239022});
        let token = format!("Bearer {}.{}.signature", encode(&header), encode(&payload));

        let jwt = decode_bearer(&token).unwrap();
        assert_eq!(Value::Object(jwt.header), header);
        assert_eq!(Value::Object(jwt.payload), payload);
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert_eq!(decode_bearer(""), None);
        assert_eq!(decode_bearer("Bearer "), None);
        assert_eq!(decode_bearer("Basic dXNlcjpwYXNz"), None);
        assert_eq!(decode_bearer("Bearer bad.bad.bad"), None);
        assert_eq!(decode_bearer("Bearer a.b"), None);

        let header = encode(&json!({"alg": "none"}));
        // payload decodes but is a JSON array, not an object
        let payload = encode(&json!([1, 2, 3]));
        assert_eq!(decode_bearer(&format!("Bearer {header}.{payload}.x")), None);
        // padded base64 is rejected
        assert_eq!(decode_bearer(&format!("Bearer {header}=.{header}.x")), None);
    }

    #[test]
    fn form_merges_body_before_query() {
        let fields = form_fields(Some("a=query&b=2"), b"a=body&c=hello+world");
        assert_eq!(fields["a"], vec!["body", "query"]);
        assert_eq!(fields["b"], vec!["2"]);
        assert_eq!(fields["c"], vec!["hello world"]);
    }

    #[test]
    fn report_captures_request_metadata() {
        let request = Request::builder()
            .method("GET")
            .uri("/echo?x=1")
            .header("host", "example.test:8080")
            .header("x-custom", "one")
            .header("x-custom", "two")
            .body(())
            .unwrap();
        let (parts, ()) = request.into_parts();
        let remote: SocketAddr = "10.0.0.7:41234".parse().unwrap();

        let report = EchoReport::new(&parts, remote, b"");
        assert_eq!(report.proto, "HTTP/1.1");
        assert_eq!(report.method, "GET");
        assert_eq!(report.host, "example.test:8080");
        assert_eq!(report.request_uri, "/echo?x=1");
        assert_eq!(report.remote_addr, "10.0.0.7:41234");
        assert_eq!(report.header["X-Custom"], vec!["one", "two"]);
        assert!(!report.header.contains_key("Host"));
        assert_eq!(report.form["x"], vec!["1"]);
        assert!(report.authorization.jwt.is_none());
    }

    #[test]
    fn pretty_json_uses_four_space_indent() {
        let request = Request::builder().uri("/echo").body(()).unwrap();
        let (parts, ()) = request.into_parts();
        let report = EchoReport::new(&parts, "127.0.0.1:1".parse().unwrap(), b"");

        let json = String::from_utf8(report.to_pretty_json().unwrap()).unwrap();
        assert!(json.contains("\n    \"Header\": {}"));
        assert!(json.contains("\"Authorization\": {}"));
    }
}
