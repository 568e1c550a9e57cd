use crate::{
    address::{Address, ADDRESS_LENGTH},
    configuration::Configuration,
    error::Error,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account Data Record
///
/// The satellite record holding one account's current logic pointer and
/// encoded policy. It lives at an address derived from the owning account's
/// address only, so a remove-and-rewrite at the same key changes content
/// without changing identity. The generation counts rewrites; a proxy built
/// against an older generation is stale.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AccountData {
    pub logic: Address,
    pub configuration: Vec<u8>,
    pub generation: u64,
    pub created_at: DateTime<Utc>,
}

impl AccountData {
    pub fn new(logic: Address, configuration: Vec<u8>, generation: u64) -> Self {
        Self {
            logic,
            configuration,
            generation,
            created_at: Utc::now(),
        }
    }

    /// The record as one opaque blob: `logic (20 bytes) || configuration`.
    pub fn payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(ADDRESS_LENGTH + self.configuration.len());
        out.extend_from_slice(self.logic.as_bytes());
        out.extend_from_slice(&self.configuration);
        out
    }

    /// Splits a payload blob at the fixed-width logic prefix.
    pub fn split_payload(payload: &[u8]) -> Result<(Address, &[u8]), Error> {
        if payload.len() < ADDRESS_LENGTH {
            return Err(Error::SemanticError(format!(
                "Payload too short: {}",
                payload.len()
            )));
        }
        use arrayref::array_ref;
        let logic = Address::new(array_ref!(payload, 0, ADDRESS_LENGTH).to_owned());
        Ok((logic, &payload[ADDRESS_LENGTH..]))
    }

    pub fn decode_configuration(&self) -> Result<Configuration, Error> {
        Configuration::decode(&self.configuration)
    }
}
