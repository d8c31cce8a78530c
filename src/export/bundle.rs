//! Per-run output bundle.
//!
//! Each run produces one timestamped directory under the output root holding
//! the JSON document, the HTML report and a zip archive of the directory's
//! contents. A re-run within the same second overwrites the previous bundle
//! in place. All I/O failures here are fatal to the run.

use std::fs::File;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::core::document::ReportDocument;
use crate::export::json_export;
use crate::util::constants::{OUTPUT_DIR_PREFIX, REPORT_HTML_NAME, REPORT_JSON_NAME};
use crate::util::error::Result;

/// Locations of the artifacts produced by [`write_bundle`].
#[derive(Debug, Clone)]
pub struct BundlePaths {
    /// The timestamped run directory.
    pub directory: PathBuf,
    /// The JSON report document inside the run directory.
    pub json_path: PathBuf,
    /// The HTML report page inside the run directory.
    pub html_path: PathBuf,
    /// The zip archive of the run directory's files.
    pub zip_path: PathBuf,
}

/// Write the complete output bundle into `output_dir`.
///
/// Creates the directory (and any missing parents), writes the JSON and
/// HTML artifacts into it, then archives every file in the directory into
/// `BlueBox_<run_stamp>.zip` alongside them. Both artifact files are closed
/// before archiving starts, so the archive always holds their final bytes.
///
/// # Errors
/// Any failure to create, write or archive the bundle is returned as-is;
/// the run has nothing to show for itself without its artifacts.
pub fn write_bundle(
    output_dir: &Path,
    run_stamp: &str,
    document: &ReportDocument,
    html: &str,
) -> Result<BundlePaths> {
    std::fs::create_dir_all(output_dir)?;

    let json_path = output_dir.join(REPORT_JSON_NAME);
    json_export::write_document(document, &json_path)?;

    let html_path = output_dir.join(REPORT_HTML_NAME);
    std::fs::write(&html_path, html)?;
    tracing::info!("Wrote report page: {}", html_path.display());

    let zip_path = output_dir.join(format!("{OUTPUT_DIR_PREFIX}{run_stamp}.zip"));
    zip_directory(output_dir, &zip_path)?;
    tracing::info!("Wrote bundle archive: {}", zip_path.display());

    Ok(BundlePaths {
        directory: output_dir.to_path_buf(),
        json_path,
        html_path,
        zip_path,
    })
}

/// Archive every file under `directory` into a zip at `archive_path`.
///
/// The archive itself is skipped so it never tries to swallow its own tail.
/// Entry names are relative to `directory` with `/` separators, and entries
/// are added in sorted order so the archive layout is stable across runs.
fn zip_directory(directory: &Path, archive_path: &Path) -> Result<()> {
    let file = File::create(archive_path)?;
    let mut zip = ZipWriter::new(file);
    add_directory_entries(&mut zip, directory, "", archive_path)?;
    zip.finish()?;
    Ok(())
}

fn add_directory_entries(
    zip: &mut ZipWriter<File>,
    directory: &Path,
    prefix: &str,
    skip: &Path,
) -> Result<()> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut entries = std::fs::read_dir(directory)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        if path == skip {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let entry_name = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };
        if path.is_dir() {
            add_directory_entries(zip, &path, &entry_name, skip)?;
        } else {
            zip.start_file(entry_name.as_str(), options.clone())?;
            let mut input = File::open(&path)?;
            std::io::copy(&mut input, zip)?;
        }
    }
    Ok(())
}
