use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::config::StorageConfig;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum SignerError {
    #[error("storage credentials not configured")]
    MissingCredentials,

    #[error("invalid storage endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Credential-signing capability of the storage provider. The server never
/// hands storage account secrets to the client; it returns a time-bounded
/// URL scoped to one key, content type, and length.
#[async_trait]
pub trait StorageSigner: Send + Sync {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        content_length: u64,
    ) -> Result<String, SignerError>;
}

/// SigV4 query presigner for S3-compatible storage (R2). Signing is pure
/// computation over the request shape; no network round trip.
pub struct SigV4Signer {
    config: StorageConfig,
}

impl SigV4Signer {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    fn presign_put_at(
        &self,
        key: &str,
        content_type: &str,
        content_length: u64,
        now: DateTime<Utc>,
    ) -> Result<String, SignerError> {
        let cfg = &self.config;
        if cfg.access_key_id.is_empty() || cfg.secret_access_key.is_empty() {
            return Err(SignerError::MissingCredentials);
        }

        let endpoint = url::Url::parse(&cfg.endpoint)
            .map_err(|_| SignerError::InvalidEndpoint(cfg.endpoint.clone()))?;
        let host = endpoint
            .host_str()
            .ok_or_else(|| SignerError::InvalidEndpoint(cfg.endpoint.clone()))?
            .to_string();

        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let datestamp = now.format("%Y%m%d").to_string();
        let scope = format!("{}/{}/s3/aws4_request", datestamp, cfg.region);
        let credential = format!("{}/{}", cfg.access_key_id, scope);

        // Path-style addressing: /{bucket}/{key}
        let canonical_uri = format!(
            "/{}/{}",
            uri_encode(&cfg.bucket, false),
            uri_encode(key, false)
        );

        let signed_headers = "content-length;content-type;host";
        let mut query: Vec<(String, String)> = vec![
            ("X-Amz-Algorithm".into(), "AWS4-HMAC-SHA256".into()),
            ("X-Amz-Credential".into(), credential),
            ("X-Amz-Date".into(), amz_date.clone()),
            ("X-Amz-Expires".into(), cfg.presign_expiry_secs.to_string()),
            ("X-Amz-SignedHeaders".into(), signed_headers.into()),
        ];
        query.sort();
        let canonical_query = query
            .iter()
            .map(|(k, v)| format!("{}={}", uri_encode(k, true), uri_encode(v, true)))
            .collect::<Vec<_>>()
            .join("&");

        let canonical_headers = format!(
            "content-length:{}\ncontent-type:{}\nhost:{}\n",
            content_length, content_type, host
        );

        let canonical_request = format!(
            "PUT\n{}\n{}\n{}\n{}\nUNSIGNED-PAYLOAD",
            canonical_uri, canonical_query, canonical_headers, signed_headers
        );

        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{}",
            amz_date,
            scope,
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let signing_key = derive_signing_key(
            &cfg.secret_access_key,
            &datestamp,
            &cfg.region,
            "s3",
        );
        let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes()));

        Ok(format!(
            "{}://{}{}?{}&X-Amz-Signature={}",
            endpoint.scheme(),
            host,
            canonical_uri,
            canonical_query,
            signature
        ))
    }
}

#[async_trait]
impl StorageSigner for SigV4Signer {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        content_length: u64,
    ) -> Result<String, SignerError> {
        self.presign_put_at(key, content_type, content_length, Utc::now())
    }
}

/// Storage object key namespaced by the uploading user plus a fresh random
/// identifier and a timestamp, so users cannot collide with or overwrite
/// each other's objects.
pub fn object_key(user_id: Uuid, now: DateTime<Utc>) -> String {
    format!(
        "recipes/{}/{}-{}",
        user_id,
        Uuid::new_v4().simple(),
        now.timestamp_millis()
    )
}

/// Public serving URL for an object key. Deriving it does not confirm the
/// object was actually uploaded.
pub fn public_url(public_domain: &str, key: &str) -> String {
    format!("https://{}/{}", public_domain, key)
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn derive_signing_key(secret: &str, datestamp: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{}", secret).as_bytes(), datestamp.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

/// RFC 3986 percent-encoding as SigV4 requires: unreserved characters stay,
/// '/' stays in paths but not in query components.
fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b'/' if !encode_slash => out.push('/'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
