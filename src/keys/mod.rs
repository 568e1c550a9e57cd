use crate::{address::Address, derivation::key_address, error::Error};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

/// Length of one signature chunk: `r || s || v`.
pub const SIGNATURE_LENGTH: usize = 65;

/// Recover Signer
///
/// Recovers the address that produced the given 65-byte chunk over a
/// 32-byte digest. The trailing recovery byte is accepted in both its raw
/// (0/1) and offset (27/28) forms.
pub fn recover(digest: &[u8; 32], chunk: &[u8]) -> Result<Address, Error> {
    if chunk.len() != SIGNATURE_LENGTH {
        return Err(Error::SemanticError(format!(
            "Incorrect signature length: {}",
            chunk.len()
        )));
    }
    let v = match chunk[64] {
        v @ 0..=1 => v,
        v @ 27..=28 => v - 27,
        v => {
            return Err(Error::SemanticError(format!(
                "Invalid recovery byte: {}",
                v
            )))
        }
    };
    let recovery_id = RecoveryId::from_byte(v).ok_or_else(|| {
        Error::SemanticError(format!("Invalid recovery byte: {}", chunk[64]))
    })?;
    let signature = Signature::from_slice(&chunk[..64])?;
    let key = VerifyingKey::recover_from_prehash(digest, &signature, recovery_id)?;
    Ok(key_address(&key))
}

/// Splits a blob of concatenated signature chunks. Fails when the blob is
/// not an exact multiple of the chunk length.
pub fn split_signatures(blob: &[u8]) -> Result<impl Iterator<Item = &[u8]>, Error> {
    if blob.len() % SIGNATURE_LENGTH != 0 {
        return Err(Error::SemanticError(format!(
            "Signature blob length {} is not a multiple of {}",
            blob.len(),
            SIGNATURE_LENGTH
        )));
    }
    Ok(blob.chunks(SIGNATURE_LENGTH))
}
