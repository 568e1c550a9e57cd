use crate::{address::Address, error::Error, proxy::AccountProxy, store::AccountData};

#[cfg(feature = "sled-db")]
pub mod sled;

/// Account Database
///
/// Persistence seam for the two record kinds the protocol owns: account
/// data records (keyed by their derived data address) and proxy records
/// (keyed by the account address). Implementations use interior mutability;
/// sequencing of whole operations is the ledger's concern.
pub trait AccountDatabase {
    /// Data records, keyed by derived data address.
    fn account_data(&self, address: &Address) -> Result<Option<AccountData>, Error>;

    fn write_account_data(&self, address: &Address, record: &AccountData) -> Result<(), Error>;

    fn remove_account_data(&self, address: &Address) -> Result<(), Error>;

    /// Proxy records, keyed by account address.
    fn proxy(&self, address: &Address) -> Result<Option<AccountProxy>, Error>;

    fn write_proxy(&self, address: &Address, record: &AccountProxy) -> Result<(), Error>;

    fn remove_proxy(&self, address: &Address) -> Result<(), Error>;
}
