use crate::{
    address::Address,
    derivation::key_address,
    error::Error,
    keys::SIGNATURE_LENGTH,
};
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use zeroize::Zeroize;

/// Owner Signer
///
/// Client-side holder of one owner's secp256k1 key. Produces the 65-byte
/// recoverable chunks consumed by the account's threshold verification.
/// Key custody beyond this wrapper is the embedder's concern.
pub struct Signer {
    key: SigningKey,
}

impl Signer {
    pub fn new() -> Self {
        Self {
            key: SigningKey::random(&mut OsRng),
        }
    }

    /// Imports a 32-byte secret scalar. The seed copy is scrubbed once the
    /// key has been constructed.
    pub fn from_seed(mut seed: Vec<u8>) -> Result<Self, Error> {
        let key = SigningKey::from_slice(&seed)?;
        seed.zeroize();
        Ok(Self { key })
    }

    /// The address this signer contributes toward a threshold.
    pub fn address(&self) -> Address {
        key_address(self.key.verifying_key())
    }

    /// Signs a 32-byte digest, returning `r || s || v` with v in 27/28 form.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<Vec<u8>, Error> {
        let (signature, recovery_id) = self.key.sign_prehash_recoverable(digest)?;
        let mut chunk = Vec::with_capacity(SIGNATURE_LENGTH);
        chunk.extend_from_slice(&signature.to_bytes());
        chunk.push(recovery_id.to_byte() + 27);
        Ok(chunk)
    }
}

impl Default for Signer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derivation::keccak256;

    #[test]
    fn test_seed_import_matches_fresh_key() -> Result<(), Error> {
        let fresh = Signer::new();
        let seed = fresh.key.to_bytes().to_vec();
        let imported = Signer::from_seed(seed)?;
        assert_eq!(fresh.address(), imported.address());
        Ok(())
    }

    #[test]
    fn test_chunk_shape() -> Result<(), Error> {
        let signer = Signer::new();
        let chunk = signer.sign_digest(&keccak256(b"shape"))?;
        assert_eq!(chunk.len(), SIGNATURE_LENGTH);
        assert!(chunk[64] == 27 || chunk[64] == 28);
        Ok(())
    }

    #[test]
    fn test_bad_seed() {
        assert!(Signer::from_seed(vec![0u8; 31]).is_err());
        // the zero scalar is not a valid secret key
        assert!(Signer::from_seed(vec![0u8; 32]).is_err());
    }
}
