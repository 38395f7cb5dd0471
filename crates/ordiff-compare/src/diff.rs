//! Structural deep comparison of two receipt trees.

use serde_json::Value;

use crate::types::{ComparisonResult, Discrepancy, DiscrepancyKind};

/// A payload counts as empty when the endpoint reported nothing for the
/// block: JSON null, an empty object, or an empty array.
pub fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(seq) => seq.is_empty(),
        _ => false,
    }
}

/// Compare two normalized receipt payloads.
///
/// Two empty payloads match (both indexers agree nothing happened at this
/// height). Exactly one empty payload yields a single discrepancy naming the
/// missing side. Otherwise the trees are walked structurally: objects are
/// keyed by key identity regardless of order, arrays positionally, and any
/// scalar or type mismatch is reported as changed.
pub fn compare_payloads(primary: &Value, secondary: &Value) -> ComparisonResult {
    match (is_empty_payload(primary), is_empty_payload(secondary)) {
        (true, true) => ComparisonResult::matching(),
        (true, false) => ComparisonResult::from_discrepancies(vec![Discrepancy {
            kind: DiscrepancyKind::MissingOnPrimary,
            path: "$".to_string(),
            detail: "primary indexer returned no data for this block".to_string(),
        }]),
        (false, true) => ComparisonResult::from_discrepancies(vec![Discrepancy {
            kind: DiscrepancyKind::MissingOnSecondary,
            path: "$".to_string(),
            detail: "secondary indexer returned no data for this block".to_string(),
        }]),
        (false, false) => {
            let mut discrepancies = Vec::new();
            diff_value(primary, secondary, "$", &mut discrepancies);
            ComparisonResult::from_discrepancies(discrepancies)
        }
    }
}

fn diff_value(primary: &Value, secondary: &Value, path: &str, out: &mut Vec<Discrepancy>) {
    match (primary, secondary) {
        (Value::Object(a), Value::Object(b)) => {
            for (key, value_a) in a {
                let child = format!("{}.{}", path, key);
                match b.get(key) {
                    Some(value_b) => diff_value(value_a, value_b, &child, out),
                    None => out.push(Discrepancy {
                        kind: DiscrepancyKind::Removed,
                        path: child,
                        detail: format!("present only on primary: {}", render(value_a)),
                    }),
                }
            }
            for (key, value_b) in b {
                if !a.contains_key(key) {
                    out.push(Discrepancy {
                        kind: DiscrepancyKind::Added,
                        path: format!("{}.{}", path, key),
                        detail: format!("present only on secondary: {}", render(value_b)),
                    });
                }
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            let common = a.len().min(b.len());
            for index in 0..common {
                diff_value(&a[index], &b[index], &format!("{}[{}]", path, index), out);
            }
            for index in common..a.len() {
                out.push(Discrepancy {
                    kind: DiscrepancyKind::Removed,
                    path: format!("{}[{}]", path, index),
                    detail: format!("present only on primary: {}", render(&a[index])),
                });
            }
            for index in common..b.len() {
                out.push(Discrepancy {
                    kind: DiscrepancyKind::Added,
                    path: format!("{}[{}]", path, index),
                    detail: format!("present only on secondary: {}", render(&b[index])),
                });
            }
        }
        (a, b) => {
            if a != b {
                out.push(Discrepancy {
                    kind: DiscrepancyKind::Changed,
                    path: path.to_string(),
                    detail: format!("primary={}, secondary={}", render(a), render(b)),
                });
            }
        }
    }
}

// Discrepancy lines end up in warn-level logs; keep oversized values short.
fn render(value: &Value) -> String {
    const MAX_LEN: usize = 160;
    let rendered = value.to_string();
    if rendered.chars().count() <= MAX_LEN {
        return rendered;
    }
    let truncated: String = rendered.chars().take(MAX_LEN).collect();
    format!("{}...", truncated)
}
