//! Comparator for Ordinal inscription block receipts.

use serde_json::Value;

use super::BlockComparator;

/// Ordinal receipts are compared verbatim; no normalization is needed.
pub struct OrdinalComparator;

impl BlockComparator for OrdinalComparator {
    fn protocol_name(&self) -> &'static str {
        "Ordinal"
    }

    fn normalize(&self, payload: Value) -> Value {
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_receipts_match() {
        let payload = json!({
            "block": [{"events": [{"inscription_id": "abc0", "sat": 1234}]}]
        });
        let result = OrdinalComparator.compare_block_receipts(payload.clone(), payload);
        assert!(result.matched);
    }

    #[test]
    fn normalization_is_identity() {
        let payload = json!({"block": [{"events": [{"valid": false, "msg": "kept"}]}]});
        assert_eq!(OrdinalComparator.normalize(payload.clone()), payload);
    }
}
