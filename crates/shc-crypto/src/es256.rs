//! # ES256 Signing and Verification
//!
//! SMART Health Cards are signed with ECDSA over P-256 using SHA-256
//! (JWS `alg: ES256`). A JWS signature is the fixed-width concatenation
//! `r || s`, each a 32-byte big-endian integer, not DER.

use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use rand_core::OsRng;
use zeroize::Zeroizing;

use shc_core::base64url;

use crate::error::CryptoError;
use crate::jwk::{jwk_thumbprint, Jwk};

/// Length of one P-256 coordinate or scalar in bytes.
const COORDINATE_LEN: usize = 32;

/// An ES256 signature: `r || s`, 64 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Es256Signature([u8; 64]);

impl Es256Signature {
    /// Wrap raw signature bytes, which must be exactly 64 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 64] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidSignatureLength(bytes.len()))?;
        Ok(Self(arr))
    }

    /// Decode the third segment of a compact JWS.
    pub fn from_base64url(text: &str) -> Result<Self, CryptoError> {
        Self::from_bytes(&base64url::decode(text)?)
    }

    /// The `r` component, big-endian.
    pub fn r(&self) -> &[u8] {
        &self.0[..COORDINATE_LEN]
    }

    /// The `s` component, big-endian.
    pub fn s(&self) -> &[u8] {
        &self.0[COORDINATE_LEN..]
    }

    /// The raw 64 signature bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Encode for use as the third segment of a compact JWS.
    pub fn to_base64url(&self) -> String {
        base64url::encode(&self.0)
    }
}

/// A P-256 public key used to verify ES256 signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Es256VerifyingKey {
    inner: VerifyingKey,
}

impl Es256VerifyingKey {
    /// Build a verifying key from the `x` and `y` members of a JWK.
    pub fn from_jwk(jwk: &Jwk) -> Result<Self, CryptoError> {
        let x = decode_coordinate("x", jwk.x.as_deref())?;
        let y = decode_coordinate("y", jwk.y.as_deref())?;

        let mut sec1 = Vec::with_capacity(1 + 2 * COORDINATE_LEN);
        sec1.push(0x04);
        sec1.extend_from_slice(&x);
        sec1.extend_from_slice(&y);

        let inner = VerifyingKey::from_sec1_bytes(&sec1)
            .map_err(|_| CryptoError::InvalidPublicKey("point is not on P-256".to_string()))?;
        Ok(Self { inner })
    }

    /// Verify `signature` over `message`.
    pub fn verify(&self, message: &[u8], signature: &Es256Signature) -> Result<(), CryptoError> {
        let sig = Signature::from_slice(signature.as_bytes())
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
        self.inner
            .verify(message, &sig)
            .map_err(|_| CryptoError::VerificationFailed("signature does not match".to_string()))
    }

    /// Public JWK for this key, with `kid` set to its RFC 7638 thumbprint.
    pub fn to_jwk(&self) -> Result<Jwk, CryptoError> {
        let point = self.inner.to_encoded_point(false);
        let (x, y) = match (point.x(), point.y()) {
            (Some(x), Some(y)) => (base64url::encode(x), base64url::encode(y)),
            _ => {
                return Err(CryptoError::InvalidPublicKey(
                    "point at infinity has no coordinates".to_string(),
                ))
            }
        };
        let mut jwk = Jwk {
            kty: Some("EC".to_string()),
            kid: None,
            key_use: Some("sig".to_string()),
            alg: Some("ES256".to_string()),
            crv: Some("P-256".to_string()),
            x: Some(x),
            y: Some(y),
            d: None,
        };
        jwk.kid = Some(jwk_thumbprint(&jwk)?);
        Ok(jwk)
    }
}

/// A P-256 private key used to issue ES256-signed cards.
///
/// The scalar is zeroized on drop by the underlying `p256` type.
pub struct Es256SigningKey {
    inner: SigningKey,
}

impl std::fmt::Debug for Es256SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Es256SigningKey")
            .field("scalar", &"[REDACTED]")
            .finish()
    }
}

impl Es256SigningKey {
    /// Generate a fresh key from the operating system RNG.
    pub fn generate() -> Self {
        Self {
            inner: SigningKey::random(&mut OsRng),
        }
    }

    /// Load a private key from the `d` member of a JWK.
    pub fn from_jwk(jwk: &Jwk) -> Result<Self, CryptoError> {
        let encoded = jwk
            .d
            .as_deref()
            .ok_or_else(|| CryptoError::InvalidPrivateKey("missing member \"d\"".to_string()))?;
        let scalar = Zeroizing::new(base64url::decode(encoded)?);
        if scalar.len() != COORDINATE_LEN {
            return Err(CryptoError::InvalidPrivateKey(format!(
                "expected {COORDINATE_LEN} bytes, got {}",
                scalar.len()
            )));
        }
        let inner = SigningKey::from_slice(&scalar)
            .map_err(|_| CryptoError::InvalidPrivateKey("scalar out of range".to_string()))?;
        Ok(Self { inner })
    }

    /// Sign `message` with ES256.
    pub fn sign(&self, message: &[u8]) -> Es256Signature {
        let sig: Signature = self.inner.sign(message);
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(&sig.to_bytes());
        Es256Signature(bytes)
    }

    /// The matching public key.
    pub fn verifying_key(&self) -> Es256VerifyingKey {
        Es256VerifyingKey {
            inner: VerifyingKey::from(&self.inner),
        }
    }

    /// Private JWK (public members plus `d`).
    pub fn to_private_jwk(&self) -> Result<Jwk, CryptoError> {
        let mut jwk = self.verifying_key().to_jwk()?;
        let scalar = Zeroizing::new(self.inner.to_bytes().to_vec());
        jwk.d = Some(base64url::encode(&scalar));
        Ok(jwk)
    }
}

fn decode_coordinate(name: &str, value: Option<&str>) -> Result<Vec<u8>, CryptoError> {
    let encoded = value
        .ok_or_else(|| CryptoError::InvalidPublicKey(format!("missing member \"{name}\"")))?;
    let bytes = base64url::decode(encoded)?;
    if bytes.len() != COORDINATE_LEN {
        return Err(CryptoError::InvalidPublicKey(format!(
            "coordinate {name} must be {COORDINATE_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwk::JwkSet;

    fn example_jwk() -> Jwk {
        Jwk {
            kty: Some("EC".into()),
            kid: Some("3Kfdg-XwP-7gXyywtUfUADwBumDOPKMQx-iELL11W9s".into()),
            key_use: Some("sig".into()),
            alg: Some("ES256".into()),
            crv: Some("P-256".into()),
            x: Some("11XvRWy1I2S0EyJlyf_bWfw_TQ5CJJNLw78bHXNxcgw".into()),
            y: Some("eZXwxvO1hvCY0KucrPfKo7yAyMT6Ajc3N7OkAB6VYy8".into()),
            d: None,
        }
    }

    #[test]
    fn example_issuer_key_is_on_curve() {
        let vk = Es256VerifyingKey::from_jwk(&example_jwk()).unwrap();
        let round = vk.to_jwk().unwrap();
        assert_eq!(round.x, example_jwk().x);
        assert_eq!(round.y, example_jwk().y);
        assert_eq!(round.kid, example_jwk().kid);
    }

    #[test]
    fn sign_then_verify() {
        let sk = Es256SigningKey::generate();
        let vk = sk.verifying_key();
        let sig = sk.sign(b"header.payload");
        vk.verify(b"header.payload", &sig).unwrap();
    }

    #[test]
    fn verify_rejects_other_message() {
        let sk = Es256SigningKey::generate();
        let sig = sk.sign(b"header.payload");
        let err = sk.verifying_key().verify(b"header.tampered", &sig).unwrap_err();
        assert!(matches!(err, CryptoError::VerificationFailed(_)));
    }

    #[test]
    fn verify_rejects_other_key() {
        let sig = Es256SigningKey::generate().sign(b"msg");
        let other = Es256SigningKey::generate().verifying_key();
        assert!(other.verify(b"msg", &sig).is_err());
    }

    #[test]
    fn signature_components_split_at_32() {
        let mut bytes = [0u8; 64];
        bytes[0] = 1;
        bytes[32] = 2;
        let sig = Es256Signature::from_bytes(&bytes).unwrap();
        assert_eq!(sig.r().len(), 32);
        assert_eq!(sig.s().len(), 32);
        assert_eq!(sig.r()[0], 1);
        assert_eq!(sig.s()[0], 2);
    }

    #[test]
    fn signature_length_is_enforced() {
        assert!(matches!(
            Es256Signature::from_bytes(&[0u8; 63]),
            Err(CryptoError::InvalidSignatureLength(63))
        ));
        assert!(matches!(
            Es256Signature::from_bytes(&[0u8; 72]),
            Err(CryptoError::InvalidSignatureLength(72))
        ));
    }

    #[test]
    fn zero_signature_is_rejected_before_verification() {
        let vk = Es256SigningKey::generate().verifying_key();
        let sig = Es256Signature::from_bytes(&[0u8; 64]).unwrap();
        assert!(matches!(
            vk.verify(b"msg", &sig),
            Err(CryptoError::InvalidSignature(_))
        ));
    }

    #[test]
    fn base64url_signature_round_trip() {
        let sig = Es256SigningKey::generate().sign(b"msg");
        let decoded = Es256Signature::from_base64url(&sig.to_base64url()).unwrap();
        assert_eq!(decoded, sig);
    }

    #[test]
    fn jwk_with_bad_coordinates_is_rejected() {
        let mut jwk = example_jwk();
        jwk.x = Some(base64url::encode(&[1u8; 31]));
        assert!(matches!(
            Es256VerifyingKey::from_jwk(&jwk),
            Err(CryptoError::InvalidPublicKey(_))
        ));

        let mut off_curve = example_jwk();
        off_curve.y = Some(base64url::encode(&[7u8; 32]));
        assert!(Es256VerifyingKey::from_jwk(&off_curve).is_err());
    }

    #[test]
    fn private_jwk_loads_back_and_publishes_cleanly() {
        let sk = Es256SigningKey::generate();
        let private = sk.to_private_jwk().unwrap();
        assert!(private.d.is_some());
        assert!(!private.is_es256_verification_key());

        let reloaded = Es256SigningKey::from_jwk(&private).unwrap();
        let sig = reloaded.sign(b"msg");
        sk.verifying_key().verify(b"msg", &sig).unwrap();

        let set = JwkSet {
            keys: vec![private.to_public()],
        };
        let kid = private.kid.clone().unwrap();
        let found = set.find_verification_key(&kid).unwrap();
        Es256VerifyingKey::from_jwk(found)
            .unwrap()
            .verify(b"msg", &sig)
            .unwrap();
    }

    #[test]
    fn signing_key_debug_is_redacted() {
        let rendered = format!("{:?}", Es256SigningKey::generate());
        assert!(rendered.contains("[REDACTED]"));
    }
}
