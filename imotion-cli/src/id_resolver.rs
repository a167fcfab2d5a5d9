//! ID resolver module
//!
//! Resolves history entry prefixes to full UUIDs so users can type a short,
//! unambiguous prefix instead of the whole id.

use anyhow::{Result, anyhow};
use imotion_core::domain::history::HistoryEntry;
use uuid::Uuid;

use crate::types::IdOrPrefix;

/// Resolve a history entry ID or prefix to a full UUID
///
/// A full UUID is returned as-is, even if no entry carries it; the caller
/// reports missing entries.
///
/// # Errors
/// Returns an error if:
/// - No entry matches the prefix
/// - Multiple entries match the prefix (ambiguous)
pub fn resolve_entry_id(entries: &[HistoryEntry], id_or_prefix: &IdOrPrefix) -> Result<Uuid> {
    // If it's already a full UUID, return it
    if let Some(uuid) = id_or_prefix.as_uuid() {
        return Ok(uuid);
    }

    let prefix = id_or_prefix.to_string();

    if prefix.is_empty() {
        return Err(anyhow!("Entry ID prefix cannot be empty"));
    }

    let matches: Vec<_> = entries
        .iter()
        .filter(|e| e.id.to_string().starts_with(prefix.as_str()))
        .collect();

    match matches.len() {
        0 => Err(anyhow!(
            "No history entry found with ID starting with '{}'",
            prefix
        )),
        1 => Ok(matches[0].id),
        _ => {
            let ids: Vec<String> = matches.iter().map(|e| e.id.to_string()).collect();
            Err(anyhow!(
                "Ambiguous prefix '{}' matches multiple entries: {}",
                prefix,
                ids.join(", ")
            ))
        }
    }
}
