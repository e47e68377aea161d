//! Dependency resolution: whether a field's rules currently apply.
//!
//! A field may declare that it is only validated while other fields hold
//! specific values (e.g. `spouse_name` only matters while
//! `marital_status` is `"married"`). Resolution is a pure read of the
//! current value snapshot; it never caches and is safe to recompute on
//! every value change.

use std::collections::HashMap;

use crate::field::{FieldSpec, FormConfig, FormValues};

/// Decide whether `field`'s validation is active under `values`.
///
/// A field with no dependency is always active. A field with a
/// dependency map is active only if every referenced field currently
/// holds its required value; a single mismatch — or a referenced field
/// missing from the snapshot — suspends it.
pub fn resolve(field: &FieldSpec, values: &FormValues) -> bool {
    field
        .dependency
        .iter()
        .all(|(other, required)| values.get(other).is_some_and(|v| v == required))
}

/// Resolve the active flag for every field in the form.
pub fn resolve_all(config: &FormConfig, values: &FormValues) -> HashMap<String, bool> {
    config
        .fields
        .iter()
        .map(|f| (f.name.clone(), resolve(f, values)))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
