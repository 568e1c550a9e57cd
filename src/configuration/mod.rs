use crate::{
    address::Address,
    error::Error,
    keys::{recover, split_signatures},
};
use serde::{Deserialize, Serialize};

/// Account Configuration
///
/// The threshold-over-owner-set policy an account enforces. Owners are kept
/// strictly ascending; together with the strictly-increasing signer rule in
/// `verify` this rejects duplicate signers in a single pass and lets
/// membership checks binary-search the set.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    #[serde(rename = "t")]
    pub threshold: u64,

    #[serde(rename = "o")]
    pub owners: Vec<Address>,
}

impl Configuration {
    pub fn new(threshold: u64, owners: Vec<Address>) -> Self {
        Self { threshold, owners }
    }

    /// Checks the policy invariants: `1 <= threshold <= |owners|` and
    /// owners strictly ascending. Enforced whenever a configuration is
    /// about to be written into a data record.
    pub fn validate(&self) -> Result<(), Error> {
        if self.threshold == 0 || self.threshold > self.owners.len() as u64 {
            return Err(Error::SemanticError(format!(
                "Threshold {} out of range for {} owners",
                self.threshold,
                self.owners.len()
            )));
        }
        if self.owners.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(Error::SemanticError(
                "Owners must be strictly ascending".into(),
            ));
        }
        Ok(())
    }

    /// Fixed, self-describing tuple encoding of the policy.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_cbor::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        Ok(serde_cbor::from_slice(bytes)?)
    }

    /// Verify
    ///
    /// Verifies a blob of concatenated 65-byte signature chunks against the
    /// given digest. Recovered signer addresses must be strictly increasing
    /// across the chunk sequence and every one must be an owner; the blob
    /// is accepted iff the accepted count reaches the threshold.
    ///
    /// All failure reasons - malformed blob, unrecoverable chunk,
    /// out-of-order or repeated signer, non-member signer, insufficient
    /// count - collapse into a plain `false`. Callers that need the
    /// standard magic-value calling convention wrap this result.
    pub fn verify(&self, digest: &[u8; 32], blob: &[u8]) -> bool {
        let chunks = match split_signatures(blob) {
            Ok(chunks) => chunks,
            Err(_) => return false,
        };

        let mut previous: Option<Address> = None;
        let mut accepted: u64 = 0;
        for chunk in chunks {
            let signer = match recover(digest, chunk) {
                Ok(signer) => signer,
                Err(_) => return false,
            };
            if let Some(ref prev) = previous {
                if &signer <= prev {
                    return false;
                }
            }
            if self.owners.binary_search(&signer).is_err() {
                return false;
            }
            previous = Some(signer);
            accepted += 1;
        }

        accepted >= self.threshold
    }
}
