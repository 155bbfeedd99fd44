//! Rendering feed items for the terminal

use std::io::{self, Write};

use crate::cli::OutputFormat;
use crate::feed::FeedItem;

/// Writes `items` to `out` in the requested format
///
/// Text output is one `id<TAB>uri<TAB>createdAt` line per item, with `-` when
/// an item carries no metadata. JSON output is a single pretty-printed array.
pub fn write_items<W: Write>(out: &mut W, items: &[FeedItem], format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Text => {
            for item in items {
                let created_at = item
                    .metadata()
                    .map(|m| m.created_at.to_rfc3339())
                    .unwrap_or_else(|| "-".to_string());
                writeln!(out, "{}\t{}\t{}", item.id(), item.uri(), created_at)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, items)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
