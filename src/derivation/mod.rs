use crate::address::{Address, Salt};
use k256::{ecdsa::VerifyingKey, elliptic_curve::sec1::ToEncodedPoint};
use sha3::{Digest, Keccak256};

/// Derivation Procedures
///
/// Every unit on the ledger lives at an address derived here. Account and
/// data record addresses are functions of stable identity inputs only,
/// never of the content stored behind them; that is what lets a
/// configuration record be swapped in place while the account keeps its
/// externally known address.

/// Domain tag standing in for the account proxy's code digest.
const PROXY_CODE: &[u8] = b"quorum-account/proxy/v1";

/// Domain tag standing in for the data record's code digest.
const DATA_CODE: &[u8] = b"quorum-account/data/v1";

/// Domain tag for logic implementation registration.
const LOGIC_CODE: &[u8] = b"quorum-account/logic/v1";

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Account Address Derivation
///
/// `keccak256(0xff || factory || salt || keccak256(proxy code))`, truncated
/// to the trailing 20 bytes. Depends on the factory identity and the salt
/// alone, so the same salt reproduces the same address regardless of which
/// logic or configuration is supplied at creation time.
pub fn account_address(factory: &Address, salt: &Salt) -> Address {
    let mut preimage = Vec::with_capacity(1 + 20 + 32 + 32);
    preimage.push(0xff);
    preimage.extend_from_slice(factory.as_bytes());
    preimage.extend_from_slice(salt.as_bytes());
    preimage.extend_from_slice(&keccak256(PROXY_CODE));
    Address::from_digest(&keccak256(&preimage))
}

/// Data Record Address Derivation
///
/// A function of the owning account's address only. Destroying and
/// recreating the record therefore always lands at the same address.
pub fn data_address(account: &Address) -> Address {
    let mut preimage = Vec::with_capacity(1 + 20 + 32);
    preimage.push(0xff);
    preimage.extend_from_slice(account.as_bytes());
    preimage.extend_from_slice(&keccak256(DATA_CODE));
    Address::from_digest(&keccak256(&preimage))
}

/// Logic Address Derivation
///
/// Registration address for the n-th logic implementation deployed against
/// a given entry point.
pub fn logic_address(entry_point: &Address, index: u64) -> Address {
    let mut preimage = Vec::with_capacity(32 + 20 + 8);
    preimage.extend_from_slice(&keccak256(LOGIC_CODE));
    preimage.extend_from_slice(entry_point.as_bytes());
    preimage.extend_from_slice(&index.to_be_bytes());
    Address::from_digest(&keccak256(&preimage))
}

/// Signer Address Derivation
///
/// The trailing 20 bytes of the Keccak-256 digest of the uncompressed
/// public key, without its 0x04 tag byte.
pub fn key_address(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    Address::from_digest(&keccak256(&point.as_bytes()[1..]))
}
