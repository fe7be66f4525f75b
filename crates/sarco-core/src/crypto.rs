//! Cryptographic primitives for the sarco protocol
//!
//! Key-share commitments are compressed secp256k1 points; accountability is
//! address-based (Keccak-256 of the uncompressed point). Signer recovery is
//! isolated behind the [`SignerRecovery`] trait so engines never depend on
//! curve internals directly.

use k256::{
    ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey},
    elliptic_curve::sec1::ToEncodedPoint,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use sha3::Keccak256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};
use crate::types::{hex_bytes_32, hex_bytes_33, Address, SarcoId, Timestamp};

/// Compressed public key (33 bytes) - the committed key-share material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(#[serde(with = "hex_bytes_33")] pub [u8; 33]);

impl PublicKey {
    /// Create a new PublicKey from compressed bytes
    pub fn new(bytes: [u8; 33]) -> Self {
        Self(bytes)
    }

    /// Get the compressed bytes
    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Create from hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut bytes = [0u8; 33];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| Error::InvalidKey(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Derive the account address for this key
    pub fn to_address(&self) -> Result<Address> {
        let point = k256::PublicKey::from_sec1_bytes(&self.0)
            .map_err(|e| Error::InvalidKey(format!("invalid public key: {}", e)))?;
        let uncompressed = point.to_encoded_point(false);
        Ok(address_from_uncompressed(uncompressed.as_bytes()))
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Raw private key material (32-byte scalar)
///
/// Only ever persisted inside a curse record once published, at which point
/// it is public data by definition. Wiped on drop everywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKeyBytes(#[serde(with = "hex_bytes_32")] pub [u8; 32]);

impl PrivateKeyBytes {
    /// Create from raw scalar bytes
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the scalar bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Create from hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| Error::InvalidKey(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Derive the compressed public key for this scalar
    pub fn derive_public_key(&self) -> Result<PublicKey> {
        let secret = k256::SecretKey::from_slice(&self.0)
            .map_err(|e| Error::InvalidKey(format!("invalid private key: {}", e)))?;
        let encoded = secret.public_key().to_encoded_point(true);
        let bytes: [u8; 33] = encoded
            .as_bytes()
            .try_into()
            .map_err(|_| Error::InvalidKey("failed to encode public key".to_string()))?;
        Ok(PublicKey::new(bytes))
    }
}

/// Recoverable ECDSA signature (65 bytes: r || s || v)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature(pub [u8; 65]);

impl RecoverableSignature {
    /// Create a new signature from bytes
    pub fn new(bytes: [u8; 65]) -> Self {
        Self(bytes)
    }

    /// Get the signature bytes
    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    /// Get the r || s component
    pub fn rs(&self) -> &[u8] {
        &self.0[..64]
    }

    /// Get the recovery byte
    pub fn v(&self) -> u8 {
        self.0[64]
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Create from hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut bytes = [0u8; 65];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| Error::InvalidSignature(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Sign `message` with the given scalar, producing a recoverable signature
    ///
    /// This is the off-chain side of the seam: archaeologists sign curse
    /// commitments with their identity key; accusers sign accusal proofs
    /// with a leaked share key.
    pub fn sign(secret: &PrivateKeyBytes, message: &[u8]) -> Result<Self> {
        let signing_key = SigningKey::from_slice(secret.as_bytes())
            .map_err(|e| Error::InvalidKey(format!("invalid signing key: {}", e)))?;
        let prehash = keccak256(message);
        let (signature, recovery_id) = signing_key
            .sign_prehash_recoverable(&prehash)
            .map_err(|e| Error::InvalidSignature(e.to_string()))?;
        let mut bytes = [0u8; 65];
        bytes[..64].copy_from_slice(signature.to_bytes().as_slice());
        bytes[64] = recovery_id.to_byte();
        Ok(Self(bytes))
    }
}

impl Serialize for RecoverableSignature {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for RecoverableSignature {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let mut bytes = [0u8; 65];
        hex::decode_to_slice(&s, &mut bytes).map_err(serde::de::Error::custom)?;
        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for RecoverableSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recover the signer identity from a message and signature
///
/// Swappable seam: the production implementation is [`EcdsaRecovery`]; tests
/// may substitute a deterministic stub.
pub trait SignerRecovery {
    /// Recover the address that produced `signature` over `message`
    fn recover(&self, message: &[u8], signature: &RecoverableSignature) -> Result<Address>;
}

/// Production signer recovery: ECDSA public-key recovery over the
/// Keccak-256 digest of the message bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct EcdsaRecovery;

impl SignerRecovery for EcdsaRecovery {
    fn recover(&self, message: &[u8], signature: &RecoverableSignature) -> Result<Address> {
        let prehash = keccak256(message);
        let sig = K256Signature::from_slice(signature.rs())
            .map_err(|e| Error::InvalidSignature(format!("malformed r||s: {}", e)))?;
        // Accept both raw (0/1) and legacy offset (27/28) recovery bytes
        let v = signature.v();
        let v = if v >= 27 { v - 27 } else { v };
        let recovery_id = RecoveryId::from_byte(v)
            .ok_or_else(|| Error::InvalidSignature(format!("invalid recovery byte: {}", v)))?;
        let verifying_key = VerifyingKey::recover_from_prehash(&prehash, &sig, recovery_id)
            .map_err(|e| Error::InvalidSignature(format!("recovery failed: {}", e)))?;
        let uncompressed = verifying_key.to_encoded_point(false);
        Ok(address_from_uncompressed(uncompressed.as_bytes()))
    }
}

/// Build the message an archaeologist signs when agreeing to a curse
///
/// Binds the key-share commitment, both payload locators, the negotiated
/// interval/time/fee, and the archaeologist's own address, so a commitment
/// cannot be replayed across negotiations or participants.
pub fn curse_commitment_message(
    public_key: &PublicKey,
    payload_locators: &[String; 2],
    maximum_rewrap_interval: u64,
    creation_time: Timestamp,
    digging_fee_per_second: u128,
    archaeologist: Address,
) -> Vec<u8> {
    let mut message = Vec::with_capacity(128);
    message.extend_from_slice(b"sarco/curse/v1");
    message.extend_from_slice(public_key.as_bytes());
    for locator in payload_locators {
        message.extend_from_slice(&(locator.len() as u32).to_le_bytes());
        message.extend_from_slice(locator.as_bytes());
    }
    message.extend_from_slice(&maximum_rewrap_interval.to_le_bytes());
    message.extend_from_slice(&creation_time.to_le_bytes());
    message.extend_from_slice(&digging_fee_per_second.to_le_bytes());
    message.extend_from_slice(archaeologist.as_bytes());
    message
}

/// Build the message an accuser signs with a leaked share key
///
/// Binds the payment address so a relayed accusal cannot be front-run and
/// redirected.
pub fn accusal_message(sarco_id: SarcoId, payment_address: Address) -> Vec<u8> {
    let mut message = Vec::with_capacity(68);
    message.extend_from_slice(b"sarco/accusal/v1");
    message.extend_from_slice(sarco_id.as_bytes());
    message.extend_from_slice(payment_address.as_bytes());
    message
}

/// Hash data using Keccak-256
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash data using SHA-256
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

fn address_from_uncompressed(sec1: &[u8]) -> Address {
    // 0x04 tag byte, then 64 bytes of point data
    let hash = keccak256(&sec1[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    Address::new(bytes)
}
