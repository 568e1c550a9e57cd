use crate::{
    address::Address,
    configuration::Configuration,
    database::AccountDatabase,
    derivation::data_address,
    error::Error,
    operation::{user_op_digest, UserOperation},
    store::AccountData,
};
use serde::{Deserialize, Serialize};

/// Signature Check Magic Value
///
/// Soft result of an advisory signature check, following the standard
/// two-fixed-4-byte-values convention. Every verification failure collapses
/// into the single invalid sentinel; the reason is deliberately not
/// distinguishable from the return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicValue {
    Valid,
    Invalid,
}

impl MagicValue {
    pub const VALID: [u8; 4] = [0x16, 0x26, 0xba, 0x7e];
    pub const INVALID: [u8; 4] = [0xff, 0xff, 0xff, 0xff];

    pub fn from_check(valid: bool) -> Self {
        if valid {
            MagicValue::Valid
        } else {
            MagicValue::Invalid
        }
    }

    pub fn as_bytes(&self) -> [u8; 4] {
        match self {
            MagicValue::Valid => Self::VALID,
            MagicValue::Invalid => Self::INVALID,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, MagicValue::Valid)
    }
}

/// Validation Result
///
/// Soft result of relayed-operation validation: accepted maps to the zero
/// word, rejected to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Accepted,
    Rejected,
}

impl Validation {
    pub fn as_word(&self) -> u64 {
        match self {
            Validation::Accepted => 0,
            Validation::Rejected => 1,
        }
    }
}

/// Outbound Call Dispatcher
///
/// Settlement of calls the account makes to other units - value transfers,
/// relay prefunding, arbitrary commands - is the embedder's concern. A
/// dispatcher failure propagates upward as the account's own failure.
pub trait OutboundCall {
    fn call(
        &mut self,
        from: Address,
        to: Address,
        value: u128,
        data: &[u8],
    ) -> Result<Vec<u8>, Error>;
}

/// Call Environment
///
/// Context a logic implementation executes under. `account` carries the
/// proxy the call arrived through; it is `None` when the implementation is
/// invoked directly, in which case nothing configuration-backed can run.
pub struct CallEnv<'a> {
    pub db: &'a dyn AccountDatabase,
    pub account: Option<Address>,
    pub caller: Address,
    pub chain_id: u64,
}

/// Self Call
///
/// Typed encoding of a call the account addresses to itself, the only path
/// that reaches the privileged reconfiguration entry point.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum InnerCall {
    Configure {
        logic: Address,
        configuration: Vec<u8>,
    },
}

impl InnerCall {
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_cbor::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        Ok(serde_cbor::from_slice(bytes)?)
    }
}

/// Account Logic
///
/// Capability interface of a shared, stateless account implementation.
/// Implementations read the account's configuration from its data record
/// on every invocation and never cache it; the only per-instance state is
/// the relay endpoint fixed at deployment.
pub trait AccountLogic {
    fn entry_point(&self) -> Address;

    fn get_configuration(&self, env: &CallEnv) -> Result<Configuration, Error>;

    fn is_valid_signature(
        &self,
        env: &CallEnv,
        digest: &[u8; 32],
        blob: &[u8],
    ) -> Result<MagicValue, Error>;

    fn validate_user_op(
        &self,
        env: &CallEnv,
        calls: &mut dyn OutboundCall,
        op: &UserOperation,
        op_hash: &[u8; 32],
        missing_funds: u128,
    ) -> Result<Validation, Error>;

    fn execute(
        &self,
        env: &CallEnv,
        calls: &mut dyn OutboundCall,
        target: Address,
        value: u128,
        data: &[u8],
    ) -> Result<Vec<u8>, Error>;

    fn configure(
        &self,
        env: &CallEnv,
        new_logic: Address,
        new_configuration: &[u8],
    ) -> Result<(), Error>;
}

/// Account
///
/// The shipped logic implementation: ordered threshold signatures over the
/// owner set, relay-gated validation and execution, reconfiguration by
/// swapping the data record and retiring the proxy.
pub struct Account {
    entry_point: Address,
}

impl Account {
    pub fn new(entry_point: Address) -> Self {
        Self { entry_point }
    }

    /// The single data record read backing every configuration-dependent
    /// operation. Resolvable only when called through a proxy.
    fn data(&self, env: &CallEnv) -> Result<(Address, AccountData), Error> {
        let account = env.account.ok_or(Error::NotProxied)?;
        let record = env
            .db
            .account_data(&data_address(&account))?
            .ok_or(Error::NotProxied)?;
        Ok((account, record))
    }
}

impl AccountLogic for Account {
    fn entry_point(&self) -> Address {
        self.entry_point
    }

    fn get_configuration(&self, env: &CallEnv) -> Result<Configuration, Error> {
        let (_, record) = self.data(env)?;
        record.decode_configuration()
    }

    fn is_valid_signature(
        &self,
        env: &CallEnv,
        digest: &[u8; 32],
        blob: &[u8],
    ) -> Result<MagicValue, Error> {
        let configuration = self.get_configuration(env)?;
        Ok(MagicValue::from_check(configuration.verify(digest, blob)))
    }

    fn validate_user_op(
        &self,
        env: &CallEnv,
        calls: &mut dyn OutboundCall,
        op: &UserOperation,
        op_hash: &[u8; 32],
        missing_funds: u128,
    ) -> Result<Validation, Error> {
        let (account, record) = self.data(env)?;
        if env.caller != self.entry_point {
            return Err(Error::UnauthorizedCaller);
        }

        let digest = user_op_digest(op_hash, &account, env.chain_id);
        if !record.decode_configuration()?.verify(&digest, &op.signature) {
            // a rejected operation mutates nothing
            return Ok(Validation::Rejected);
        }

        if missing_funds > 0 {
            calls.call(account, self.entry_point, missing_funds, &[])?;
        }
        Ok(Validation::Accepted)
    }

    fn execute(
        &self,
        env: &CallEnv,
        calls: &mut dyn OutboundCall,
        target: Address,
        value: u128,
        data: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let account = env.account.ok_or(Error::NotProxied)?;
        if env.caller != self.entry_point && env.caller != account {
            return Err(Error::UnauthorizedCaller);
        }

        if target == account {
            // self-call: the privileged surface, entered with the account
            // itself as caller; carries no value
            if value != 0 {
                return Err(Error::SemanticError(format!(
                    "Self-call cannot carry value: {}",
                    value
                )));
            }
            let inner_env = CallEnv {
                db: env.db,
                account: env.account,
                caller: account,
                chain_id: env.chain_id,
            };
            match InnerCall::decode(data)? {
                InnerCall::Configure {
                    logic,
                    configuration,
                } => self.configure(&inner_env, logic, &configuration)?,
            }
            Ok(vec![])
        } else {
            calls.call(account, target, value, data)
        }
    }

    fn configure(
        &self,
        env: &CallEnv,
        new_logic: Address,
        new_configuration: &[u8],
    ) -> Result<(), Error> {
        let (account, record) = self.data(env)?;
        if env.caller != account {
            return Err(Error::UnauthorizedCaller);
        }
        Configuration::decode(new_configuration)?.validate()?;

        // swap the record in place, then retire the proxy; the account has
        // no dispatchable code until a later create rebuilds it
        let key = data_address(&account);
        env.db.remove_account_data(&key)?;
        env.db.write_account_data(
            &key,
            &AccountData::new(
                new_logic,
                new_configuration.to_vec(),
                record.generation + 1,
            ),
        )?;
        env.db.remove_proxy(&account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{database::sled::SledAccountDatabase, signer::Signer};

    struct NoCalls;

    impl OutboundCall for NoCalls {
        fn call(
            &mut self,
            _from: Address,
            _to: Address,
            _value: u128,
            _data: &[u8],
        ) -> Result<Vec<u8>, Error> {
            Err(Error::CallFailed("no dispatcher".into()))
        }
    }

    fn seeded_db(account: &Address, logic: Address) -> (tempfile::TempDir, SledAccountDatabase) {
        let dir = tempfile::tempdir().unwrap();
        let db = SledAccountDatabase::new(dir.path()).unwrap();
        let owner = Signer::new();
        let configuration = Configuration::new(1, vec![owner.address()]);
        db.write_account_data(
            &data_address(account),
            &AccountData::new(logic, configuration.encode().unwrap(), 0),
        )
        .unwrap();
        (dir, db)
    }

    #[test]
    fn test_unproxied_reads_fail() {
        let dir = tempfile::tempdir().unwrap();
        let db = SledAccountDatabase::new(dir.path()).unwrap();
        let logic = Account::new(Address([0xe9; 20]));
        let env = CallEnv {
            db: &db,
            account: None,
            caller: Address::ZERO,
            chain_id: 1,
        };

        assert!(matches!(
            logic.get_configuration(&env),
            Err(Error::NotProxied)
        ));
        assert!(matches!(
            logic.is_valid_signature(&env, &[0u8; 32], &[]),
            Err(Error::NotProxied)
        ));
    }

    #[test]
    fn test_validate_gated_on_entry_point() {
        let entry_point = Address([0xe9; 20]);
        let account = Address([0x42; 20]);
        let logic_address = Address([0xaa; 20]);
        let (_dir, db) = seeded_db(&account, logic_address);
        let logic = Account::new(entry_point);

        let env = CallEnv {
            db: &db,
            account: Some(account),
            caller: Address([0x99; 20]),
            chain_id: 1,
        };
        let op = UserOperation::default();
        assert!(matches!(
            logic.validate_user_op(&env, &mut NoCalls, &op, &[0u8; 32], 0),
            Err(Error::UnauthorizedCaller)
        ));
    }

    #[test]
    fn test_configure_requires_self_call() {
        let account = Address([0x42; 20]);
        let logic_address = Address([0xaa; 20]);
        let (_dir, db) = seeded_db(&account, logic_address);
        let logic = Account::new(Address([0xe9; 20]));

        let owner = Signer::new();
        let replacement = Configuration::new(1, vec![owner.address()])
            .encode()
            .unwrap();

        let env = CallEnv {
            db: &db,
            account: Some(account),
            caller: Address([0x99; 20]),
            chain_id: 1,
        };
        assert!(matches!(
            logic.configure(&env, logic_address, &replacement),
            Err(Error::UnauthorizedCaller)
        ));

        let self_env = CallEnv {
            db: &db,
            account: Some(account),
            caller: account,
            chain_id: 1,
        };
        logic
            .configure(&self_env, logic_address, &replacement)
            .unwrap();
        let record = db.account_data(&data_address(&account)).unwrap().unwrap();
        assert_eq!(record.generation, 1);
        assert_eq!(record.configuration, replacement);
    }

    #[test]
    fn test_configure_rejects_invalid_policy() {
        let account = Address([0x42; 20]);
        let logic_address = Address([0xaa; 20]);
        let (_dir, db) = seeded_db(&account, logic_address);
        let logic = Account::new(Address([0xe9; 20]));

        let env = CallEnv {
            db: &db,
            account: Some(account),
            caller: account,
            chain_id: 1,
        };
        let degenerate = Configuration::new(0, vec![]).encode().unwrap();
        assert!(logic.configure(&env, logic_address, &degenerate).is_err());
        // the original record is untouched
        let record = db.account_data(&data_address(&account)).unwrap().unwrap();
        assert_eq!(record.generation, 0);
    }

    #[test]
    fn test_magic_values() {
        assert_eq!(MagicValue::Valid.as_bytes(), [0x16, 0x26, 0xba, 0x7e]);
        assert_eq!(MagicValue::Invalid.as_bytes(), [0xff; 4]);
        assert_eq!(Validation::Accepted.as_word(), 0);
        assert_eq!(Validation::Rejected.as_word(), 1);
    }
}
