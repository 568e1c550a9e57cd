use crate::{
    address::{Address, Salt},
    configuration::Configuration,
    database::AccountDatabase,
    derivation::{account_address, data_address},
    error::Error,
    proxy::AccountProxy,
    store::AccountData,
};

/// Account Factory
///
/// Deterministic creator of (proxy, data record) pairs. `create` is
/// idempotent: it only fills in whichever of the two units is missing and
/// never overwrites an existing data record, so calling it again with stale
/// parameters after a reconfiguration simply redeploys the proxy against
/// the current record.
pub struct AccountFactory {
    address: Address,
}

impl AccountFactory {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// The account address a given salt maps to, computable without any
    /// side effect (the simulated call wallet tooling performs before
    /// submitting the real one).
    pub fn account_address(&self, salt: &Salt) -> Address {
        account_address(&self.address, salt)
    }

    /// Create
    ///
    /// Returns the derived account address after making sure both units
    /// exist: a data record holding `(logic, configuration)` if none
    /// survives from an earlier deployment, and a proxy constructed from
    /// whatever the record holds now.
    pub fn create(
        &self,
        db: &dyn AccountDatabase,
        logic: Address,
        configuration: &[u8],
        salt: &Salt,
    ) -> Result<Address, Error> {
        let account = self.account_address(salt);
        let key = data_address(&account);

        if db.account_data(&key)?.is_none() {
            Configuration::decode(configuration)?.validate()?;
            db.write_account_data(&key, &AccountData::new(logic, configuration.to_vec(), 0))?;
        }

        if db.proxy(&account)?.is_none() {
            let proxy = AccountProxy::construct(db, &account)?;
            db.write_proxy(&account, &proxy)?;
        }

        Ok(account)
    }
}
