//! Web Push message encryption (RFC 8291, `aes128gcm` content coding).
//!
//! # Protocol
//!
//! 1. Generate an ephemeral P-256 keypair for this message
//! 2. ECDH(ephemeral private, subscription `p256dh`) gives the shared secret
//! 3. HKDF with the subscription `auth` secret mixes both public keys in
//! 4. HKDF with a random salt yields the content key and nonce
//! 5. The payload plus a final-record delimiter is sealed with AES-128-GCM
//!
//! The body starts with the RFC 8188 header: salt, record size and the
//! ephemeral public key as key id.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes128Gcm, Nonce};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hkdf::Hkdf;
use p256::ecdh::EphemeralSecret;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::PublicKey;
use sha2::Sha256;
use thiserror::Error;

const SALT_LEN: usize = 16;
const AUTH_SECRET_LEN: usize = 16;
const PUBLIC_KEY_LEN: usize = 65;
const TAG_LEN: usize = 16;
const RECORD_SIZE: u32 = 4096;
const HEADER_LEN: usize = SALT_LEN + 4 + 1 + PUBLIC_KEY_LEN;
const LAST_RECORD_DELIMITER: u8 = 0x02;

const KEY_INFO_PREFIX: &[u8] = b"WebPush: info\0";
const CEK_INFO: &[u8] = b"Content-Encoding: aes128gcm\0";
const NONCE_INFO: &[u8] = b"Content-Encoding: nonce\0";

/// Largest payload that fits into one 4096-byte push message.
pub const MAX_PAYLOAD_LEN: usize = RECORD_SIZE as usize - HEADER_LEN - TAG_LEN - 1;

/// Why a payload could not be encrypted.
#[derive(Error, Debug)]
pub enum EncryptionError {
    /// A subscription key is not valid base64url or has the wrong shape.
    #[error("invalid {0} key: {1}")]
    InvalidKey(&'static str, String),

    /// The payload does not fit into a single record.
    #[error("payload too large: {0} bytes (max {1} bytes)")]
    PayloadTooLarge(usize, usize),

    /// Key derivation or sealing failed.
    #[error("encryption failed: {0}")]
    Cipher(String),
}

/// Decode a base64url key, tolerating padding and the standard alphabet.
pub(crate) fn decode_base64url(value: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let normalized: String = value
        .trim()
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();
    URL_SAFE_NO_PAD.decode(normalized)
}

struct ContentKeys {
    cek: [u8; 16],
    nonce: [u8; 12],
}

fn hkdf_expand<const N: usize>(hkdf: &Hkdf<Sha256>, info: &[u8]) -> Result<[u8; N], EncryptionError> {
    let mut out = [0u8; N];
    hkdf.expand(info, &mut out)
        .map_err(|e| EncryptionError::Cipher(e.to_string()))?;
    Ok(out)
}

fn derive_content_keys(
    ecdh_secret: &[u8],
    auth_secret: &[u8],
    ua_public: &[u8],
    as_public: &[u8],
    salt: &[u8],
) -> Result<ContentKeys, EncryptionError> {
    let mut key_info = Vec::with_capacity(KEY_INFO_PREFIX.len() + 2 * PUBLIC_KEY_LEN);
    key_info.extend_from_slice(KEY_INFO_PREFIX);
    key_info.extend_from_slice(ua_public);
    key_info.extend_from_slice(as_public);

    let ikm: [u8; 32] = hkdf_expand(&Hkdf::<Sha256>::new(Some(auth_secret), ecdh_secret), &key_info)?;

    let prk = Hkdf::<Sha256>::new(Some(salt), &ikm);
    Ok(ContentKeys {
        cek: hkdf_expand(&prk, CEK_INFO)?,
        nonce: hkdf_expand(&prk, NONCE_INFO)?,
    })
}

/// Encrypt `payload` for the subscription keys `p256dh` and `auth`.
///
/// Returns the complete `aes128gcm` request body.
pub fn encrypt(p256dh: &str, auth: &str, payload: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(EncryptionError::PayloadTooLarge(payload.len(), MAX_PAYLOAD_LEN));
    }

    let ua_public = decode_base64url(p256dh)
        .map_err(|e| EncryptionError::InvalidKey("p256dh", e.to_string()))
        .and_then(|bytes| {
            PublicKey::from_sec1_bytes(&bytes).map_err(|_| {
                EncryptionError::InvalidKey("p256dh", "not a P-256 public key".to_string())
            })
        })?;

    let auth_secret =
        decode_base64url(auth).map_err(|e| EncryptionError::InvalidKey("auth", e.to_string()))?;
    if auth_secret.len() != AUTH_SECRET_LEN {
        return Err(EncryptionError::InvalidKey(
            "auth",
            format!("expected {} bytes, got {}", AUTH_SECRET_LEN, auth_secret.len()),
        ));
    }

    let ephemeral = EphemeralSecret::random(&mut OsRng);
    let as_public = ephemeral.public_key().to_encoded_point(false);
    let shared = ephemeral.diffie_hellman(&ua_public);

    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let keys = derive_content_keys(
        shared.raw_secret_bytes().as_slice(),
        &auth_secret,
        ua_public.to_encoded_point(false).as_bytes(),
        as_public.as_bytes(),
        &salt,
    )?;

    let mut plaintext = Vec::with_capacity(payload.len() + 1);
    plaintext.extend_from_slice(payload);
    plaintext.push(LAST_RECORD_DELIMITER);

    let cipher =
        Aes128Gcm::new_from_slice(&keys.cek).map_err(|e| EncryptionError::Cipher(e.to_string()))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&keys.nonce), plaintext.as_slice())
        .map_err(|_| EncryptionError::Cipher("AES-GCM encryption failed".to_string()))?;

    let mut body = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    body.extend_from_slice(&salt);
    body.extend_from_slice(&RECORD_SIZE.to_be_bytes());
    body.push(PUBLIC_KEY_LEN as u8);
    body.extend_from_slice(as_public.as_bytes());
    body.extend_from_slice(&ciphertext);
    Ok(body)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use p256::SecretKey;

    /// Browser side of a subscription: private key plus auth secret.
    pub struct ClientKeys {
        pub secret: SecretKey,
        pub auth_secret: [u8; AUTH_SECRET_LEN],
    }

    impl ClientKeys {
        pub fn generate() -> Self {
            let mut auth_secret = [0u8; AUTH_SECRET_LEN];
            OsRng.fill_bytes(&mut auth_secret);
            Self {
                secret: SecretKey::random(&mut OsRng),
                auth_secret,
            }
        }

        /// The `p256dh` value a browser would report.
        pub fn p256dh(&self) -> String {
            URL_SAFE_NO_PAD.encode(self.secret.public_key().to_encoded_point(false).as_bytes())
        }

        /// The `auth` value a browser would report.
        pub fn auth(&self) -> String {
            URL_SAFE_NO_PAD.encode(self.auth_secret)
        }

        /// Decrypt an `aes128gcm` body the way the browser does.
        pub fn decrypt(&self, body: &[u8]) -> Vec<u8> {
            let salt = &body[..SALT_LEN];
            let record_size = u32::from_be_bytes(body[SALT_LEN..SALT_LEN + 4].try_into().unwrap());
            assert_eq!(record_size, RECORD_SIZE);
            let id_len = body[SALT_LEN + 4] as usize;
            let key_start = SALT_LEN + 5;
            let as_public_bytes = &body[key_start..key_start + id_len];

            let as_public = PublicKey::from_sec1_bytes(as_public_bytes).unwrap();
            let shared =
                p256::ecdh::diffie_hellman(self.secret.to_nonzero_scalar(), as_public.as_affine());
            let keys = derive_content_keys(
                shared.raw_secret_bytes().as_slice(),
                &self.auth_secret,
                self.secret.public_key().to_encoded_point(false).as_bytes(),
                as_public_bytes,
                salt,
            )
            .unwrap();

            let cipher = Aes128Gcm::new_from_slice(&keys.cek).unwrap();
            let mut plaintext = cipher
                .decrypt(Nonce::from_slice(&keys.nonce), &body[key_start + id_len..])
                .unwrap();
            assert_eq!(plaintext.pop(), Some(LAST_RECORD_DELIMITER));
            plaintext
        }
    }
}
