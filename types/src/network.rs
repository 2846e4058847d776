//! Network identifier.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{FieldType, TypesError};

/// Which network a chain belongs to. Selects the header field kind blocks must carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    Mainnet,
    Testnet,
    Devnet,
}

impl NetworkId {
    pub fn header_type(&self) -> FieldType {
        match self {
            Self::Mainnet => FieldType::Head,
            Self::Testnet | Self::Devnet => FieldType::HeadTest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Devnet => "devnet",
        }
    }
}

impl FromStr for NetworkId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "devnet" => Ok(Self::Devnet),
            other => Err(TypesError::UnknownNetwork(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_types() {
        assert_eq!(NetworkId::Mainnet.header_type(), FieldType::Head);
        assert_eq!(NetworkId::Devnet.header_type(), FieldType::HeadTest);
    }

    #[test]
    fn parses_names() {
        assert_eq!("testnet".parse::<NetworkId>(), Ok(NetworkId::Testnet));
        assert!("live".parse::<NetworkId>().is_err());
    }
}
