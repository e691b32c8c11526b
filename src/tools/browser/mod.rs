//! Browser automation module
//!
//! WebDriver-backed DOM snapshots.

mod scraper;
mod snapshot;

pub use scraper::Snapshotter;
pub use snapshot::{
    format_for_display, is_interactive_tag, read_snapshot, read_snapshot_text, write_snapshot,
    ATTRIBUTES, INTERACTIVE_TAGS,
};
