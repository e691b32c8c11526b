//! Snapshot filtering and persistence
//!
//! A snapshot is the ordered list of interactive elements of one page load,
//! stored as pretty-printed JSON.

use std::path::Path;

use crate::core::{ElementRecord, HealerError, Result};

/// Tags kept in a snapshot
pub const INTERACTIVE_TAGS: &[&str] = &[
    "button", "input", "a", "select", "textarea", "img", "label",
];

/// Attributes extracted from each element, when present
pub const ATTRIBUTES: &[&str] = &[
    "id",
    "class",
    "name",
    "type",
    "placeholder",
    "role",
    "aria-label",
    "href",
    "src",
];

/// Check whether a tag belongs in a snapshot
pub fn is_interactive_tag(tag: &str) -> bool {
    INTERACTIVE_TAGS
        .iter()
        .any(|t| t.eq_ignore_ascii_case(tag))
}

/// Write a snapshot as pretty-printed UTF-8 JSON
pub async fn write_snapshot(path: &Path, records: &[ElementRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Read a snapshot back
pub async fn read_snapshot(path: &Path) -> Result<Vec<ElementRecord>> {
    let content = read_snapshot_text(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Read the raw snapshot text
pub async fn read_snapshot_text(path: &Path) -> Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(HealerError::missing(path)),
        Err(e) => Err(e.into()),
    }
}

/// Summarize a snapshot for display
pub fn format_for_display(records: &[ElementRecord]) -> String {
    let mut output = format!("Page Elements ({}):\n", records.len());

    for record in records {
        let id = record
            .attr("id")
            .map(|id| format!("#{}", id))
            .unwrap_or_default();
        let text = if record.text.is_empty() {
            String::new()
        } else {
            format!(" \"{}\"", record.text)
        };

        output.push_str(&format!("  <{}{}>{}", record.tag, id, text));

        if !record.visible {
            output.push_str(" [hidden]");
        }
        if !record.enabled {
            output.push_str(" [disabled]");
        }

        output.push('\n');
    }

    output
}
