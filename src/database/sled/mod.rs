use super::AccountDatabase;
use crate::{address::Address, error::Error, proxy::AccountProxy, store::AccountData};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

/// Sled-backed account database. One tree per record kind.
pub struct SledAccountDatabase {
    // "data" tree: derived data address -> AccountData
    data: sled::Tree,
    // "prxs" tree: account address -> AccountProxy
    proxies: sled::Tree,
}

impl SledAccountDatabase {
    pub fn new<'a, P>(path: P) -> Result<Self, Error>
    where
        P: Into<&'a Path>,
    {
        let db = sled::open(path.into())?;
        Ok(Self {
            data: db.open_tree(b"data")?,
            proxies: db.open_tree(b"prxs")?,
        })
    }

    fn get<T: DeserializeOwned>(tree: &sled::Tree, key: &Address) -> Result<Option<T>, Error> {
        match tree.get(key.as_bytes())? {
            Some(value) => Ok(Some(serde_cbor::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    fn put<T: Serialize>(tree: &sled::Tree, key: &Address, record: &T) -> Result<(), Error> {
        tree.insert(key.as_bytes(), serde_cbor::to_vec(record)?)?;
        Ok(())
    }

    fn del(tree: &sled::Tree, key: &Address) -> Result<(), Error> {
        tree.remove(key.as_bytes())?;
        Ok(())
    }
}

impl AccountDatabase for SledAccountDatabase {
    fn account_data(&self, address: &Address) -> Result<Option<AccountData>, Error> {
        Self::get(&self.data, address)
    }

    fn write_account_data(&self, address: &Address, record: &AccountData) -> Result<(), Error> {
        Self::put(&self.data, address, record)
    }

    fn remove_account_data(&self, address: &Address) -> Result<(), Error> {
        Self::del(&self.data, address)
    }

    fn proxy(&self, address: &Address) -> Result<Option<AccountProxy>, Error> {
        Self::get(&self.proxies, address)
    }

    fn write_proxy(&self, address: &Address, record: &AccountProxy) -> Result<(), Error> {
        Self::put(&self.proxies, address, record)
    }

    fn remove_proxy(&self, address: &Address) -> Result<(), Error> {
        Self::del(&self.proxies, address)
    }
}
