use serde_json::{Map, Value};

/// Lay `overlay` over `base`: every field of `overlay` wins, every other
/// field of `base` is kept.
pub fn overlay(mut base: Map<String, Value>, overlay: Map<String, Value>) -> Map<String, Value> {
    for (field, value) in overlay {
        base.insert(field, value);
    }
    base
}

/// Merge freshly prepared attributes into a loaded entity.
///
/// Fresh values take precedence for every field present in both maps, except
/// the `preserved` fields, which always keep the loaded entity's value.
pub fn merge_entity(
    loaded: &Map<String, Value>,
    fresh: Map<String, Value>,
    preserved: &[&str],
) -> Map<String, Value> {
    let mut merged = overlay(loaded.clone(), fresh);
    for &field in preserved {
        if let Some(value) = loaded.get(field) {
            merged.insert(field.to_string(), value.clone());
        }
    }
    merged
}

/// Fields whose value in `after` differs from `before`, or that only `after` has
pub fn changed_fields(before: &Map<String, Value>, after: &Map<String, Value>) -> Vec<String> {
    after
        .iter()
        .filter(|(field, value)| before.get(field.as_str()) != Some(*value))
        .map(|(field, _)| field.clone())
        .collect()
}
