pub mod address;
pub mod configuration;
pub mod database;
pub mod derivation;
pub mod error;
pub mod factory;
pub mod keys;
pub mod ledger;
pub mod logic;
pub mod operation;
pub mod proxy;
pub mod signer;
pub mod store;
