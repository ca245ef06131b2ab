//! AK/SK request signing (`SDK-HMAC-SHA256`)
//!
//! Every API call is signed over a canonical form of the request: method,
//! URI, sorted query string, the signed headers, and the SHA-256 of the
//! body. The resulting signature goes into the `Authorization` header
//! together with the access key and the list of signed headers.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use url::Url;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "SDK-HMAC-SHA256";
pub const DATE_HEADER: &str = "x-sdk-date";
pub const DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
    pub security_token: Option<String>,
}

/// Compute the `Authorization` header value for a request.
///
/// `headers` must contain every header that participates in the signature
/// (at least `host` and `x-sdk-date`), keyed by lowercase name.
pub fn sign(
    credentials: &Credentials,
    method: &str,
    url: &Url,
    headers: &BTreeMap<String, String>,
    date: &str,
    body: &[u8],
) -> String {
    let canonical = canonical_request(method, url, headers, body);
    let hashed_canonical = hex::encode(Sha256::digest(canonical.as_bytes()));
    let string_to_sign = format!("{}\n{}\n{}", ALGORITHM, date, hashed_canonical);

    let mut mac = HmacSha256::new_from_slice(credentials.secret_key.as_bytes())
        .expect("hmac-sha256 accepts keys of any length");
    mac.update(string_to_sign.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    format!(
        "{} Access={}, SignedHeaders={}, Signature={}",
        ALGORITHM,
        credentials.access_key,
        signed_headers(headers),
        signature
    )
}

fn canonical_request(
    method: &str,
    url: &Url,
    headers: &BTreeMap<String, String>,
    body: &[u8],
) -> String {
    let mut canonical_headers = String::new();
    for (name, value) in headers {
        canonical_headers.push_str(name);
        canonical_headers.push(':');
        canonical_headers.push_str(value.trim());
        canonical_headers.push('\n');
    }

    format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method.to_uppercase(),
        canonical_uri(url),
        canonical_query(url),
        canonical_headers,
        signed_headers(headers),
        hex::encode(Sha256::digest(body)),
    )
}

fn canonical_uri(url: &Url) -> String {
    let path = url.path();
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            (
                urlencoding::encode(&k).into_owned(),
                urlencoding::encode(&v).into_owned(),
            )
        })
        .collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

fn signed_headers(headers: &BTreeMap<String, String>) -> String {
    headers.keys().cloned().collect::<Vec<_>>().join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_for(host: &str, date: &str) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert("host".to_string(), host.to_string());
        headers.insert(DATE_HEADER.to_string(), date.to_string());
        headers
    }

    #[test]
    fn canonical_request_shape() {
        let url = Url::parse("https://cbh.cn-north-4.myhuaweicloud.com/v2/pid/cbs/instance/list?limit=10&id=abc").unwrap();
        let headers = headers_for("cbh.cn-north-4.myhuaweicloud.com", "20240301T120000Z");
        let canonical = canonical_request("GET", &url, &headers, b"");

        let lines: Vec<&str> = canonical.split('\n').collect();
        assert_eq!(lines[0], "GET");
        assert_eq!(lines[1], "/v2/pid/cbs/instance/list/");
        // query parameters are sorted
        assert_eq!(lines[2], "id=abc&limit=10");
        assert_eq!(lines[3], "host:cbh.cn-north-4.myhuaweicloud.com");
        assert_eq!(lines[4], "x-sdk-date:20240301T120000Z");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "host;x-sdk-date");
        // sha256 of the empty body
        assert_eq!(
            lines[7],
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn authorization_header_names_access_key_and_headers() {
        let credentials = Credentials {
            access_key: "AKIAEXAMPLE".to_string(),
            secret_key: "secret".to_string(),
            security_token: None,
        };
        let url = Url::parse("https://cts.cn-north-4.myhuaweicloud.com/v3/pid/tracker").unwrap();
        let headers = headers_for("cts.cn-north-4.myhuaweicloud.com", "20240301T120000Z");

        let auth = sign(&credentials, "POST", &url, &headers, "20240301T120000Z", b"{}");
        assert!(auth.starts_with("SDK-HMAC-SHA256 Access=AKIAEXAMPLE, SignedHeaders=host;x-sdk-date, Signature="));
        let signature = auth.rsplit('=').next().unwrap();
        assert_eq!(signature.len(), 64);
    }

    #[test]
    fn signature_depends_on_secret() {
        let url = Url::parse("https://sms.ap-southeast-1.myhuaweicloud.com/v3/tasks").unwrap();
        let headers = headers_for("sms.ap-southeast-1.myhuaweicloud.com", "20240301T120000Z");
        let a = sign(
            &Credentials {
                access_key: "ak".into(),
                secret_key: "one".into(),
                security_token: None,
            },
            "POST",
            &url,
            &headers,
            "20240301T120000Z",
            b"{}",
        );
        let b = sign(
            &Credentials {
                access_key: "ak".into(),
                secret_key: "two".into(),
                security_token: None,
            },
            "POST",
            &url,
            &headers,
            "20240301T120000Z",
            b"{}",
        );
        assert_ne!(a, b);
    }
}
