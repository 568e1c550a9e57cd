use crate::{
    address::{Address, Salt},
    configuration::Configuration,
    database::AccountDatabase,
    derivation::{data_address, logic_address},
    error::Error,
    factory::AccountFactory,
    logic::{AccountLogic, CallEnv, MagicValue, OutboundCall, Validation},
    operation::UserOperation,
    proxy::AccountProxy,
};
use std::collections::HashMap;

/// Ledger Host
///
/// The single-threaded environment the protocol runs against: one account
/// database, one registry of deployed logic implementations, one factory
/// and one outbound-call dispatcher, all under a fixed chain identity.
/// State-changing operations take `&mut self`, so operations against a
/// ledger are linearized; each runs to completion before the next begins.
pub struct Ledger<D: AccountDatabase, C: OutboundCall> {
    db: D,
    calls: C,
    factory: AccountFactory,
    logics: HashMap<Address, Box<dyn AccountLogic>>,
    chain_id: u64,
}

impl<D: AccountDatabase, C: OutboundCall> Ledger<D, C> {
    pub fn new(db: D, calls: C, factory_address: Address, chain_id: u64) -> Self {
        Self {
            db,
            calls,
            factory: AccountFactory::new(factory_address),
            logics: HashMap::new(),
            chain_id,
        }
    }

    pub fn db(&self) -> &D {
        &self.db
    }

    pub fn calls(&self) -> &C {
        &self.calls
    }

    pub fn calls_mut(&mut self) -> &mut C {
        &mut self.calls
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn factory(&self) -> &AccountFactory {
        &self.factory
    }

    /// Registers a logic implementation at a deterministic address and
    /// returns that address.
    pub fn deploy_logic(&mut self, logic: Box<dyn AccountLogic>) -> Result<Address, Error> {
        let address = logic_address(&logic.entry_point(), self.logics.len() as u64);
        if self.logics.contains_key(&address) {
            return Err(Error::AddressOccupied(address));
        }
        self.logics.insert(address, logic);
        Ok(address)
    }

    /// First-time (or repeat) account creation through the factory.
    pub fn create(
        &mut self,
        logic: Address,
        configuration: &[u8],
        salt: &Salt,
    ) -> Result<Address, Error> {
        let account = self.factory.account_address(salt);
        if self.logics.contains_key(&account) {
            return Err(Error::AddressOccupied(account));
        }
        self.factory.create(&self.db, logic, configuration, salt)
    }

    /// Whether any code is dispatchable at the given account address.
    pub fn is_deployed(&self, account: &Address) -> Result<bool, Error> {
        Ok(self.db.proxy(account)?.is_some())
    }

    fn resolve<'a>(
        db: &'a D,
        logics: &'a HashMap<Address, Box<dyn AccountLogic>>,
        account: &Address,
    ) -> Result<(AccountProxy, &'a dyn AccountLogic), Error> {
        let proxy = db.proxy(account)?.ok_or(Error::NotDeployed(*account))?;
        let record = db
            .account_data(&data_address(account))?
            .ok_or(Error::DataMissing(*account))?;
        if record.generation != proxy.generation {
            return Err(Error::StaleProxy(*account));
        }
        let logic = logics
            .get(&proxy.logic)
            .ok_or(Error::UnknownLogic(proxy.logic))?;
        Ok((proxy, logic.as_ref()))
    }

    fn env(&self, account: Address, caller: Address) -> CallEnv {
        CallEnv {
            db: &self.db,
            account: Some(account),
            caller,
            chain_id: self.chain_id,
        }
    }

    /// The cached logic pointer of a deployed account (`SELF()`).
    pub fn self_logic(&self, account: &Address) -> Result<Address, Error> {
        let (proxy, _) = Self::resolve(&self.db, &self.logics, account)?;
        Ok(proxy.logic)
    }

    /// The relay endpoint an account currently trusts (`ENTRY_POINT()`).
    pub fn entry_point(&self, account: &Address) -> Result<Address, Error> {
        let (_, logic) = Self::resolve(&self.db, &self.logics, account)?;
        Ok(logic.entry_point())
    }

    pub fn get_configuration(&self, account: &Address) -> Result<Configuration, Error> {
        let (_, logic) = Self::resolve(&self.db, &self.logics, account)?;
        logic.get_configuration(&self.env(*account, Address::ZERO))
    }

    /// The raw data record payload: `logic (20 bytes) || configuration`.
    pub fn account_data(&self, account: &Address) -> Result<Vec<u8>, Error> {
        let record = self
            .db
            .account_data(&data_address(account))?
            .ok_or(Error::DataMissing(*account))?;
        Ok(record.payload())
    }

    pub fn is_valid_signature(
        &self,
        account: &Address,
        digest: &[u8; 32],
        blob: &[u8],
    ) -> Result<MagicValue, Error> {
        let (_, logic) = Self::resolve(&self.db, &self.logics, account)?;
        logic.is_valid_signature(&self.env(*account, Address::ZERO), digest, blob)
    }

    pub fn validate_user_op(
        &mut self,
        caller: Address,
        op: &UserOperation,
        op_hash: &[u8; 32],
        missing_funds: u128,
    ) -> Result<Validation, Error> {
        let (_, logic) = Self::resolve(&self.db, &self.logics, &op.sender)?;
        let env = CallEnv {
            db: &self.db,
            account: Some(op.sender),
            caller,
            chain_id: self.chain_id,
        };
        logic.validate_user_op(&env, &mut self.calls, op, op_hash, missing_funds)
    }

    pub fn execute(
        &mut self,
        caller: Address,
        account: &Address,
        target: Address,
        value: u128,
        data: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let (_, logic) = Self::resolve(&self.db, &self.logics, account)?;
        let env = CallEnv {
            db: &self.db,
            account: Some(*account),
            caller,
            chain_id: self.chain_id,
        };
        logic.execute(&env, &mut self.calls, target, value, data)
    }

    pub fn configure(
        &mut self,
        caller: Address,
        account: &Address,
        new_logic: Address,
        new_configuration: &[u8],
    ) -> Result<(), Error> {
        let (_, logic) = Self::resolve(&self.db, &self.logics, account)?;
        let env = CallEnv {
            db: &self.db,
            account: Some(*account),
            caller,
            chain_id: self.chain_id,
        };
        logic.configure(&env, new_logic, new_configuration)
    }

    /// Calls an implementation directly, without an account context. Only
    /// the entry point is resolvable this way; configuration reads fail.
    pub fn direct_get_configuration(&self, logic: &Address) -> Result<Configuration, Error> {
        let implementation = self
            .logics
            .get(logic)
            .ok_or(Error::UnknownLogic(*logic))?;
        implementation.get_configuration(&CallEnv {
            db: &self.db,
            account: None,
            caller: Address::ZERO,
            chain_id: self.chain_id,
        })
    }

    pub fn direct_entry_point(&self, logic: &Address) -> Result<Address, Error> {
        Ok(self
            .logics
            .get(logic)
            .ok_or(Error::UnknownLogic(*logic))?
            .entry_point())
    }
}

/// Balance Sheet
///
/// A minimal settlement backend for embedders and tests: plain value
/// transfers between addresses, no code execution behind targets. Calls
/// carrying more value than the sender holds fail, and the failure
/// propagates as the account's own.
#[derive(Debug, Default)]
pub struct BalanceSheet {
    balances: HashMap<Address, u128>,
}

impl BalanceSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deposit(&mut self, address: Address, value: u128) {
        *self.balances.entry(address).or_insert(0) += value;
    }

    pub fn balance_of(&self, address: &Address) -> u128 {
        self.balances.get(address).copied().unwrap_or(0)
    }
}

impl OutboundCall for BalanceSheet {
    fn call(
        &mut self,
        from: Address,
        to: Address,
        value: u128,
        _data: &[u8],
    ) -> Result<Vec<u8>, Error> {
        if value > 0 {
            let held = self.balance_of(&from);
            if held < value {
                return Err(Error::CallFailed(format!(
                    "insufficient balance: {} holds {}, sending {}",
                    from, held, value
                )));
            }
            self.balances.insert(from, held - value);
            *self.balances.entry(to).or_insert(0) += value;
        }
        Ok(vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_sheet_transfers() {
        let a = Address([0x01; 20]);
        let b = Address([0x02; 20]);
        let mut sheet = BalanceSheet::new();
        sheet.deposit(a, 100);

        sheet.call(a, b, 60, &[]).unwrap();
        assert_eq!(sheet.balance_of(&a), 40);
        assert_eq!(sheet.balance_of(&b), 60);

        assert!(sheet.call(a, b, 41, &[]).is_err());
        assert_eq!(sheet.balance_of(&a), 40);
    }
}
