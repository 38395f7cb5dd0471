//! Protocol-specific receipt comparators and their registry.

mod brc20;
mod ordinal;

pub use brc20::Brc20Comparator;
pub use ordinal::OrdinalComparator;

use serde_json::Value;

use crate::chain::{Blockchain, Protocol};
use crate::diff::compare_payloads;
use crate::error::{CompareError, CompareResult};
use crate::types::ComparisonResult;

/// Normalize-then-diff capability for one protocol's block receipts.
pub trait BlockComparator: Send + Sync {
    /// Tag used in discrepancy lines, e.g. `"BRC20"`.
    fn protocol_name(&self) -> &'static str;

    /// Clean a raw receipt payload before comparison. Must be idempotent;
    /// an empty or absent payload passes through unchanged.
    fn normalize(&self, payload: Value) -> Value;

    /// Normalize both sides and structurally diff them.
    fn compare_block_receipts(&self, primary: Value, secondary: Value) -> ComparisonResult {
        let primary = self.normalize(primary);
        let secondary = self.normalize(secondary);
        compare_payloads(&primary, &secondary)
    }
}

type ComparatorCtor = fn() -> Box<dyn BlockComparator>;

fn make_ordinal() -> Box<dyn BlockComparator> {
    Box::new(OrdinalComparator)
}

fn make_brc20() -> Box<dyn BlockComparator> {
    Box::new(Brc20Comparator)
}

/// Registry of supported (blockchain, protocol) pairs.
static COMPARATORS: &[((Blockchain, Protocol), ComparatorCtor)] = &[
    ((Blockchain::Bitcoin, Protocol::Ordinal), make_ordinal),
    ((Blockchain::Bitcoin, Protocol::Brc20), make_brc20),
    ((Blockchain::Fractal, Protocol::Ordinal), make_ordinal),
    ((Blockchain::Fractal, Protocol::Brc20), make_brc20),
];

/// Look up the comparator for a (blockchain, protocol) pair. Performed once
/// at startup; an unsupported pair is a configuration error.
pub fn comparator_for(
    blockchain: Blockchain,
    protocol: Protocol,
) -> CompareResult<Box<dyn BlockComparator>> {
    COMPARATORS
        .iter()
        .find(|(pair, _)| *pair == (blockchain, protocol))
        .map(|(_, ctor)| ctor())
        .ok_or_else(|| {
            CompareError::Config(format!(
                "unsupported protocol {} for blockchain {}",
                protocol, blockchain
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_chain_protocol_pair_is_registered() {
        for blockchain in [Blockchain::Bitcoin, Blockchain::Fractal] {
            for protocol in [Protocol::Ordinal, Protocol::Brc20] {
                let comparator = comparator_for(blockchain, protocol).unwrap();
                let expected = match protocol {
                    Protocol::Ordinal => "Ordinal",
                    Protocol::Brc20 => "BRC20",
                };
                assert_eq!(comparator.protocol_name(), expected);
            }
        }
    }
}
