use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonical::to_canonical_json;
use crate::error::CryptoError;

/// Computes audit-record signatures as `SHA-256(canonical_json(fields))`.
///
/// This is v1.0.0 of the signature scheme: an unkeyed content digest, not an
/// HMAC. It binds a record to its own content for tamper detection; it does
/// not authenticate the signer, because nothing downstream of the governor
/// holds a shared secret to verify against. See DESIGN.md for why this
/// diverges from the teacher's HMAC-based approval signatures.
#[derive(Debug, Default, Clone, Copy)]
pub struct AuditSigner;

impl AuditSigner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Sign the given fields, returning the lowercase hex digest.
    ///
    /// # Errors
    /// Returns [`CryptoError::Encoding`] if `fields` cannot be canonicalized.
    pub fn sign<T: Serialize>(&self, fields: &T) -> Result<String, CryptoError> {
        let canonical = to_canonical_json(fields).map_err(|e| CryptoError::Encoding(e.to_string()))?;
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }

    /// Recompute the signature for `fields` and compare it against `expected`.
    ///
    /// # Errors
    /// Returns [`CryptoError::Encoding`] if `fields` cannot be canonicalized.
    pub fn verify<T: Serialize>(&self, fields: &T, expected: &str) -> Result<bool, CryptoError> {
        Ok(self.sign(fields)? == expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Fields {
        a: &'static str,
        b: i32,
    }

    #[test]
    fn sign_is_deterministic() {
        let signer = AuditSigner::new();
        let fields = Fields { a: "x", b: 1 };
        let sig1 = signer.sign(&fields).unwrap();
        let sig2 = signer.sign(&fields).unwrap();
        assert_eq!(sig1, sig2);
        assert_eq!(sig1.len(), 64);
    }

    #[test]
    fn verify_roundtrip() {
        let signer = AuditSigner::new();
        let fields = Fields { a: "x", b: 1 };
        let sig = signer.sign(&fields).unwrap();
        assert!(signer.verify(&fields, &sig).unwrap());
        assert!(!signer.verify(&fields, "0000").unwrap());
    }

    #[test]
    fn different_content_differs() {
        let signer = AuditSigner::new();
        let sig_a = signer.sign(&Fields { a: "x", b: 1 }).unwrap();
        let sig_b = signer.sign(&Fields { a: "y", b: 1 }).unwrap();
        assert_ne!(sig_a, sig_b);
    }
}
