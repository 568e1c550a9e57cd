use crate::address::Address;
use serde_cbor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("CBOR Serialization error")]
    CBORSerializationError {
        #[from]
        source: serde_cbor::Error,
    },

    #[error("Hex decoding error")]
    HexDecodingError {
        #[from]
        source: hex::FromHexError,
    },

    #[error("signature error")]
    SignatureError {
        #[from]
        source: k256::ecdsa::Error,
    },

    #[error("account must be proxied")]
    NotProxied,

    #[error("caller is not authorized for this operation")]
    UnauthorizedCaller,

    #[error("no account deployed at {0}")]
    NotDeployed(Address),

    #[error("account {0} caches a retired configuration generation")]
    StaleProxy(Address),

    #[error("no logic implementation registered at {0}")]
    UnknownLogic(Address),

    #[error("address {0} is already occupied by incompatible code")]
    AddressOccupied(Address),

    #[error("no account data record at {0}")]
    DataMissing(Address),

    #[error("outbound call failed: {0}")]
    CallFailed(String),

    #[error("Error while applying operation: {0}")]
    SemanticError(String),

    #[error("storage error")]
    StorageError,
}

#[cfg(feature = "sled-db")]
impl From<sled::Error> for Error {
    fn from(_: sled::Error) -> Self {
        Error::StorageError
    }
}
