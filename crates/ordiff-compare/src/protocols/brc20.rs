//! Comparator for BRC20 token block receipts.

use serde_json::Value;

use super::BlockComparator;

/// BRC20 receipts carry noise that must be projected away before diffing:
/// events whose validity flag is false (indexers may or may not materialize
/// them) and the free-form `msg` field, which varies between implementations
/// without affecting correctness.
pub struct Brc20Comparator;

impl BlockComparator for Brc20Comparator {
    fn protocol_name(&self) -> &'static str {
        "BRC20"
    }

    fn normalize(&self, mut payload: Value) -> Value {
        if let Some(blocks) = payload.get_mut("block").and_then(Value::as_array_mut) {
            for entry in blocks {
                let Some(events) = entry.get_mut("events").and_then(Value::as_array_mut) else {
                    continue;
                };
                events.retain(|event| {
                    event
                        .get("valid")
                        .and_then(Value::as_bool)
                        .unwrap_or(true)
                });
                for event in events {
                    if let Some(fields) = event.as_object_mut() {
                        fields.remove("msg");
                    }
                }
            }
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transfer_event(amount: &str, valid: bool, msg: &str) -> Value {
        json!({
            "type": "transfer",
            "tick": "ordi",
            "amount": amount,
            "from": "bc1qsender",
            "to": "bc1qreceiver",
            "valid": valid,
            "msg": msg,
        })
    }

    #[test]
    fn invalid_events_and_msg_fields_are_stripped() {
        let payload = json!({
            "block": [{
                "events": [
                    transfer_event("100", true, "ok"),
                    transfer_event("5", false, "insufficient balance"),
                ]
            }]
        });

        let normalized = Brc20Comparator.normalize(payload);
        let events = normalized["block"][0]["events"].as_array().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["amount"], "100");
        assert!(events[0].get("msg").is_none());
    }

    #[test]
    fn normalization_is_idempotent() {
        let payload = json!({
            "block": [{
                "events": [
                    transfer_event("100", true, "ok"),
                    transfer_event("7", false, "rejected"),
                ]
            }]
        });

        let once = Brc20Comparator.normalize(payload);
        let twice = Brc20Comparator.normalize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_payload_passes_through() {
        assert_eq!(Brc20Comparator.normalize(json!({})), json!({}));
        assert_eq!(Brc20Comparator.normalize(Value::Null), Value::Null);
    }

    #[test]
    fn identical_valid_transfers_match() {
        let payload = json!({
            "block": [{"events": [transfer_event("100", true, "ok")]}]
        });
        let result = Brc20Comparator.compare_block_receipts(payload.clone(), payload);
        assert!(result.matched);
    }

    #[test]
    fn differing_amount_yields_one_changed_discrepancy() {
        let primary = json!({
            "block": [{"events": [transfer_event("100", true, "ok")]}]
        });
        let secondary = json!({
            "block": [{"events": [transfer_event("101", true, "ok")]}]
        });
        let result = Brc20Comparator.compare_block_receipts(primary, secondary);
        assert!(!result.matched);
        assert_eq!(result.discrepancies.len(), 1);
        assert_eq!(result.discrepancies[0].path, "$.block[0].events[0].amount");
    }

    #[test]
    fn invalid_event_present_on_one_side_only_still_matches() {
        // Primary materializes the rejected event, secondary omits it
        // entirely; normalization removes it from both views.
        let primary = json!({
            "block": [{
                "events": [
                    transfer_event("100", true, "ok"),
                    transfer_event("9999", false, "exceeds supply"),
                ]
            }]
        });
        let secondary = json!({
            "block": [{"events": [transfer_event("100", true, "ok")]}]
        });
        let result = Brc20Comparator.compare_block_receipts(primary, secondary);
        assert!(result.matched, "{:?}", result.discrepancies);
    }

    #[test]
    fn differing_msg_fields_do_not_count() {
        let primary = json!({
            "block": [{"events": [transfer_event("100", true, "transfer ok")]}]
        });
        let secondary = json!({
            "block": [{"events": [transfer_event("100", true, "success")]}]
        });
        let result = Brc20Comparator.compare_block_receipts(primary, secondary);
        assert!(result.matched);
    }
}
