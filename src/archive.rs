//! Bundle Archive - Zip Container for .pcio Output
//!
//! One manifest entry plus one entry per image asset. The archive is built
//! fully in memory and written in a single call, so no partial bundle ever
//! lands on disk.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::manifest::Manifest;
use crate::pipeline::BuildError;

/// Fixed archive path of the widget manifest entry.
pub const MANIFEST_ENTRY: &str = "widgets.json";
/// Fixed path prefix for image asset entries.
pub const ASSET_PREFIX: &str = "userassets/";

/// A regular file collected from the image directory.
#[derive(Debug, Clone)]
pub struct AssetFile {
    pub name: String,
    pub path: PathBuf,
}

impl AssetFile {
    /// Archive path of this asset's entry.
    pub fn entry_path(&self) -> String {
        format!("{}{}", ASSET_PREFIX, self.name)
    }
}

/// Collect the regular files in `dir`, sorted by file name.
/// Directories and non-regular files are skipped.
pub fn collect_assets(dir: &Path) -> Result<Vec<AssetFile>, BuildError> {
    let read_err = |source| BuildError::AssetDirRead {
        path: dir.to_path_buf(),
        source,
    };
    let mut assets = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        if !entry.file_type().map_err(read_err)?.is_file() {
            continue;
        }
        assets.push(AssetFile {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
        });
    }
    assets.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(assets)
}

/// In-memory zip writer for one bundle.
pub struct BundleWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl BundleWriter {
    pub fn new() -> Self {
        // Fixed timestamp: bundle bytes must not depend on the wall clock.
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options,
        }
    }

    /// Serialize the manifest into the fixed `widgets.json` entry.
    pub fn add_manifest(&mut self, manifest: &Manifest) -> Result<(), BuildError> {
        let json = manifest.to_entry_json()?;
        self.add_entry(MANIFEST_ENTRY, json.as_bytes())
    }

    /// Add one asset entry under the `userassets/` prefix.
    pub fn add_asset(&mut self, name: &str, bytes: &[u8]) -> Result<(), BuildError> {
        self.add_entry(&format!("{}{}", ASSET_PREFIX, name), bytes)
    }

    fn add_entry(&mut self, path: &str, bytes: &[u8]) -> Result<(), BuildError> {
        self.zip.start_file(path, self.options)?;
        self.zip
            .write_all(bytes)
            .map_err(zip::result::ZipError::from)?;
        Ok(())
    }

    /// Finalize the central directory and hand back the raw bundle bytes.
    pub fn finish_to_bytes(self) -> Result<Vec<u8>, BuildError> {
        let cursor = self.zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for BundleWriter {
    fn default() -> Self {
        Self::new()
    }
}
