//! Supported blockchains and protocols.

use std::fmt;
use std::str::FromStr;

use crate::error::CompareError;

/// Blockchain networks the comparator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Blockchain {
    Bitcoin,
    Fractal,
}

impl Blockchain {
    /// Canonical lowercase network name reported by well-behaved endpoints.
    pub fn network_name(&self) -> &'static str {
        match self {
            Blockchain::Bitcoin => "bitcoin",
            Blockchain::Fractal => "fractal",
        }
    }

    /// First height at which ordinal inscriptions were active.
    pub fn first_inscription_height(&self) -> u32 {
        match self {
            Blockchain::Bitcoin => 767430,
            Blockchain::Fractal => 21000,
        }
    }

    /// First height at which the BRC20 protocol was active.
    pub fn first_brc20_height(&self) -> u32 {
        match self {
            Blockchain::Bitcoin => 779832,
            Blockchain::Fractal => 21000,
        }
    }
}

impl fmt::Display for Blockchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Blockchain::Bitcoin => f.write_str("BITCOIN"),
            Blockchain::Fractal => f.write_str("FRACTAL"),
        }
    }
}

impl FromStr for Blockchain {
    type Err = CompareError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "BITCOIN" => Ok(Blockchain::Bitcoin),
            "FRACTAL" => Ok(Blockchain::Fractal),
            _ => Err(CompareError::Config(format!(
                "invalid blockchain: {}. Valid options: BITCOIN, FRACTAL",
                value
            ))),
        }
    }
}

/// Metaprotocols whose block receipts can be compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Ordinal,
    Brc20,
}

impl Protocol {
    /// Height at which this protocol became active on the given chain.
    pub fn activation_height(&self, blockchain: Blockchain) -> u32 {
        match self {
            Protocol::Ordinal => blockchain.first_inscription_height(),
            Protocol::Brc20 => blockchain.first_brc20_height(),
        }
    }

    /// Path segment used by the indexer REST API for this protocol.
    pub fn receipt_path_segment(&self) -> &'static str {
        match self {
            Protocol::Ordinal => "ord",
            Protocol::Brc20 => "brc20",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Ordinal => f.write_str("ORDINAL"),
            Protocol::Brc20 => f.write_str("BRC20"),
        }
    }
}

impl FromStr for Protocol {
    type Err = CompareError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "ORDINAL" => Ok(Protocol::Ordinal),
            "BRC20" => Ok(Protocol::Brc20),
            _ => Err(CompareError::Config(format!(
                "invalid protocol: {}. Valid options: ORDINAL, BRC20",
                value
            ))),
        }
    }
}
