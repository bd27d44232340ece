//! Label selector evaluation (equality-based and set-based).

use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use std::collections::BTreeMap;

/// Whether a labels mapping satisfies a selector.
///
/// A missing selector matches everything, and so does an empty one (neither
/// `match_labels` nor `match_expressions`). All entries are AND-combined.
/// Missing label keys behave as the empty string: they fail any non-empty
/// equality, fail `In`, fail `NotIn` and `Exists`, and satisfy `DoesNotExist`.
pub fn matches(labels: Option<&BTreeMap<String, String>>, selector: Option<&LabelSelector>) -> bool {
    let Some(selector) = selector else {
        return true;
    };

    let label = |key: &str| {
        labels
            .and_then(|all| all.get(key))
            .map(String::as_str)
            .unwrap_or_default()
    };

    if let Some(required) = &selector.match_labels {
        for (key, value) in required {
            if label(key) != value {
                return false;
            }
        }
    }

    if let Some(expressions) = &selector.match_expressions {
        for expression in expressions {
            let current = label(&expression.key);
            let values = expression.values.as_deref().unwrap_or_default();
            let satisfied = match expression.operator.as_str() {
                "In" => values.iter().any(|v| v == current),
                "NotIn" => !current.is_empty() && values.iter().all(|v| v != current),
                "Exists" => !current.is_empty(),
                "DoesNotExist" => current.is_empty(),
                // The operator set is closed; anything else selects nothing.
                _ => false,
            };
            if !satisfied {
                return false;
            }
        }
    }

    true
}
