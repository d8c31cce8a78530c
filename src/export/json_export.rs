//! JSON artifact for the report document.
//!
//! Serialises the complete document as pretty-printed JSON using Serde.

use std::path::Path;

use crate::core::document::ReportDocument;
use crate::util::error::Result;

/// Write the document to a JSON file at `path`.
///
/// # Errors
/// Returns an error if the file cannot be created or written; the caller
/// treats that as fatal to the run.
pub fn write_document(document: &ReportDocument, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;

    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, document)?;

    // BufWriter::drop swallows write errors; flush to surface them.
    use std::io::Write;
    writer.flush()?;

    tracing::info!(
        "Wrote report document ({} events, {} applications): {}",
        document.events.total(),
        document.applications.len(),
        path.display()
    );
    Ok(())
}
