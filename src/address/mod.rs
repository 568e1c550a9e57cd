use crate::error::Error;
use core::{
    fmt::{Display, Formatter},
    str::FromStr,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const ADDRESS_LENGTH: usize = 20;
pub const SALT_LENGTH: usize = 32;

/// Account Address
///
/// A 20-byte identifier for every unit on the ledger: accounts, logic
/// implementations, configuration data records and external signers alike.
/// Ordering is byte-wise, which matches the numeric big-endian ordering
/// used by the strictly-increasing signer rule.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Default)]
pub struct Address(pub [u8; ADDRESS_LENGTH]);

impl Address {
    pub const ZERO: Address = Address([0u8; ADDRESS_LENGTH]);

    pub fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Takes the trailing 20 bytes of a 32-byte digest, the usual way an
    /// address is carved out of a hash.
    pub fn from_digest(digest: &[u8; 32]) -> Self {
        use arrayref::array_ref;
        Self(array_ref!(digest, 12, ADDRESS_LENGTH).to_owned())
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != ADDRESS_LENGTH {
            return Err(Error::SemanticError(format!(
                "Incorrect address length: {}",
                bytes.len()
            )));
        }
        let mut out = [0u8; ADDRESS_LENGTH];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_str(&self) -> String {
        ["0x", &hex::encode(self.0)].join("")
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)?;
        Address::from_slice(&bytes)
    }
}

/// Serde compatible Serialize
impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_str())
    }
}

/// Serde compatible Deserialize
impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Address, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        Address::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Creation Salt
///
/// The content-independent input to account address derivation. The same
/// salt always reproduces the same account address under a given factory.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Salt(pub [u8; SALT_LENGTH]);

impl Salt {
    pub const ZERO: Salt = Salt([0u8; SALT_LENGTH]);

    pub fn new(bytes: [u8; SALT_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Salt {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)?;
        if bytes.len() != SALT_LENGTH {
            return Err(Error::SemanticError(format!(
                "Incorrect salt length: {}",
                bytes.len()
            )));
        }
        let mut out = [0u8; SALT_LENGTH];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl Display for Salt {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

#[test]
fn test_address_roundtrip() -> Result<(), Error> {
    let addr: Address = "0xee00000000000000000000000000000000000001".parse()?;
    assert_eq!(addr.to_str(), "0xee00000000000000000000000000000000000001");
    assert_eq!(addr, Address::from_slice(addr.as_bytes())?);
    Ok(())
}

#[test]
fn test_address_ordering() {
    let lo = Address([0x01; ADDRESS_LENGTH]);
    let hi = Address([0x02; ADDRESS_LENGTH]);
    assert!(lo < hi);
    assert!(Address::ZERO < lo);
}

#[test]
fn test_bad_address() {
    assert!("0x0102".parse::<Address>().is_err());
    assert!("not hex".parse::<Address>().is_err());
}
