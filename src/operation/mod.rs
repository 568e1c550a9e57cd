use crate::{address::Address, derivation::keccak256};
use serde::{Deserialize, Serialize};

/// Relayed Operation
///
/// The bundled operation a relay endpoint submits on an account's behalf.
/// The account only interprets `sender` and `signature`; the remaining
/// fields belong to the relay's fee and gas bookkeeping and are carried
/// opaquely.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UserOperation {
    pub sender: Address,
    pub nonce: u64,
    pub init_code: Vec<u8>,
    pub call_data: Vec<u8>,
    pub call_gas_limit: u64,
    pub verification_gas_limit: u64,
    pub pre_verification_gas: u64,
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
    pub paymaster_and_data: Vec<u8>,
    pub signature: Vec<u8>,
}

/// Typed-data domain and struct tags. The domain covers the chain identity
/// and the verifying account; nothing else is bound.
fn domain_typehash() -> [u8; 32] {
    keccak256(b"EIP712Domain(uint256 chainId,address verifyingContract)")
}

fn user_op_typehash() -> [u8; 32] {
    keccak256(b"AccountUserOp(bytes32 userOpHash)")
}

fn left_pad_address(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

fn u256_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

fn domain_separator(chain_id: u64, account: &Address) -> [u8; 32] {
    let mut preimage = Vec::with_capacity(96);
    preimage.extend_from_slice(&domain_typehash());
    preimage.extend_from_slice(&u256_word(chain_id));
    preimage.extend_from_slice(&left_pad_address(account));
    keccak256(&preimage)
}

/// Operation Digest
///
/// Domain-separated digest binding a relay-supplied operation hash to one
/// account on one chain, so a signature cannot be replayed against a
/// different account or network:
/// `keccak256(0x19 || 0x01 || domain_separator || keccak256(typehash || op_hash))`.
pub fn user_op_digest(op_hash: &[u8; 32], account: &Address, chain_id: u64) -> [u8; 32] {
    let struct_hash = {
        let mut preimage = Vec::with_capacity(64);
        preimage.extend_from_slice(&user_op_typehash());
        preimage.extend_from_slice(op_hash);
        keccak256(&preimage)
    };

    let mut preimage = Vec::with_capacity(2 + 64);
    preimage.extend_from_slice(&[0x19, 0x01]);
    preimage.extend_from_slice(&domain_separator(chain_id, account));
    preimage.extend_from_slice(&struct_hash);
    keccak256(&preimage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_domain_separated() {
        let op_hash = keccak256(b"some relayed operation");
        let account = Address([0x10; 20]);

        let digest = user_op_digest(&op_hash, &account, 1);
        // stable for identical inputs
        assert_eq!(digest, user_op_digest(&op_hash, &account, 1));
        // a different network, account or operation changes the digest
        assert_ne!(digest, user_op_digest(&op_hash, &account, 5));
        assert_ne!(digest, user_op_digest(&op_hash, &Address([0x11; 20]), 1));
        assert_ne!(
            digest,
            user_op_digest(&keccak256(b"another operation"), &account, 1)
        );
        // and the digest never equals the raw operation hash
        assert_ne!(digest, op_hash);
    }
}
