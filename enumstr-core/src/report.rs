//! JSON report of a selection.

use serde_json::{json, Map, Value};

use crate::select::Selection;

/// Builds the `--json` report: selected types with their constant names in
/// declaration order, plus the requests that matched nothing.
pub fn selection_json(package: &str, selection: &Selection) -> Value {
    let types: Map<String, Value> = selection
        .types
        .keys()
        .map(|name| (name.clone(), json!(selection.names(name))))
        .collect();

    json!({
        "package": package,
        "types": types,
        "unsatisfied": selection.unsatisfied,
    })
}
