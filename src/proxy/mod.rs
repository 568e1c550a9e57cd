use crate::{
    address::Address,
    database::AccountDatabase,
    derivation::data_address,
    error::Error,
};
use serde::{Deserialize, Serialize};

/// Account Proxy
///
/// The account's externally addressed unit. It captures the logic pointer
/// from the paired data record exactly once, at construction, together with
/// the record's generation at that moment. The pointer never changes for
/// the lifetime of the deployment; reconfiguration retires the proxy and a
/// later recreation re-reads the (by then rewritten) record.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct AccountProxy {
    pub logic: Address,
    pub generation: u64,
}

impl AccountProxy {
    /// Constructs a proxy for the given account address by performing the
    /// single read of its paired data record. Fails when the record does
    /// not exist yet; the factory must have written it first.
    pub fn construct(db: &dyn AccountDatabase, account: &Address) -> Result<Self, Error> {
        let record = db
            .account_data(&data_address(account))?
            .ok_or_else(|| Error::DataMissing(*account))?;
        Ok(Self {
            logic: record.logic,
            generation: record.generation,
        })
    }
}
