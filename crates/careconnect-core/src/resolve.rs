//! Per-field reconciliation of live content against the reference dataset.
//!
//! Each field is decided on its own: a present live value wins, anything
//! else is filled from the reference. A single domain object can therefore
//! end up partly live and partly reference-sourced.

use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use crate::bundle::{Content, ContentBundle, Domain, Fields, LiveResponse};

/// Whether a value counts as present for merging.
///
/// `null`, blank strings, empty arrays and empty objects are absent.
/// Numbers and booleans are always present, including `0` and `false`.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Merge `live` over `reference` for one section of a bundle.
///
/// Returns the merged fields and the names of fields taken from the
/// reference. When `live` is `None` or empty the reference comes back
/// unchanged with every field marked as backfilled. Live fields that are
/// absent and have no reference counterpart are dropped.
///
/// `section` only labels the trace output; it never changes the result.
pub fn resolve(section: &str, live: Option<&Fields>, reference: &Fields) -> (Fields, Vec<String>) {
    let live = match live {
        Some(fields) if !fields.is_empty() => fields,
        _ => return (reference.clone(), reference.keys().cloned().collect()),
    };

    let mut merged = Fields::new();
    for (name, value) in live {
        if is_present(value) {
            merged.insert(name.clone(), value.clone());
        }
    }

    let mut backfilled = Vec::new();
    for (name, value) in reference {
        if !merged.contains_key(name) {
            merged.insert(name.clone(), value.clone());
            backfilled.push(name.clone());
        }
    }

    if !backfilled.is_empty() {
        trace!(section, fields = ?backfilled, "backfilled from reference");
    }
    (merged, backfilled)
}

/// Fields of one bundle section that were filled from the reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Backfill {
    pub section: String,
    pub fields: Vec<String>,
}

/// Output of [`resolve_bundle`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub bundle: ContentBundle,
    /// Sections that needed at least one reference field.
    pub backfilled: Vec<Backfill>,
    /// True when no live response was usable and the reference was used whole.
    pub wholesale: bool,
}

/// Resolve a complete bundle from an optional live response.
///
/// `None` means the fetch failed or the payload was rejected; the reference
/// is returned verbatim and nothing is merged.
pub fn resolve_bundle(live: Option<&LiveResponse>, reference: &ContentBundle) -> Resolution {
    let Some(live) = live else {
        return Resolution {
            bundle: reference.clone(),
            backfilled: Vec::new(),
            wholesale: true,
        };
    };

    let mut backfilled = Vec::new();
    let mut section = |name: &str, live: Option<&Fields>, reference: &Fields| {
        let (merged, fields) = resolve(name, live, reference);
        if !fields.is_empty() {
            backfilled.push(Backfill {
                section: name.to_string(),
                fields,
            });
        }
        merged
    };

    let patient_info = section("patient_info", Some(&live.patient_info), &reference.patient_info);
    let mut content = Content::default();
    for domain in Domain::ALL {
        *content.get_mut(domain) =
            section(domain.key(), live.domain(domain), reference.domain(domain));
    }
    let metadata = section("metadata", Some(&live.metadata), &reference.metadata);

    Resolution {
        bundle: ContentBundle {
            patient_info,
            content,
            metadata,
        },
        backfilled,
        wholesale: false,
    }
}
