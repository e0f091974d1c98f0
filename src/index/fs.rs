//! Directory-backed media index.
//!
//! Walks a root directory for image files and serves them through the
//! [`MediaIndex`] interface:
//! - ids are root-relative paths
//! - insertion time is approximated by file mtime (newest first)
//! - dimensions come from header-only probes, EXIF supplies orientation

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use image::ImageReader;
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::error::IndexError;
use crate::index::MediaIndex;
use crate::models::{IndexEntry, Orientation};

/// Extensions treated as images.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff", "tif"];

/// A media index backed by a directory tree on the local filesystem.
pub struct FsMediaIndex {
    root: PathBuf,
}

impl FsMediaIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_image(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// Root-relative id for a discovered file.
    fn id_for(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }

    /// Header-only dimension probe; broken files report 0x0 so the
    /// grid can still show a placeholder for them.
    fn probe_dimensions(path: &Path) -> (u32, u32) {
        match ImageReader::open(path) {
            Ok(reader) => match reader.into_dimensions() {
                Ok((w, h)) => (w, h),
                Err(e) => {
                    warn!(?path, error = %e, "Failed to read image dimensions");
                    (0, 0)
                }
            },
            Err(e) => {
                warn!(?path, error = %e, "Failed to open image");
                (0, 0)
            }
        }
    }

    /// EXIF orientation mapped to degrees; files without EXIF (or with
    /// the mirrored variants this crate does not model) read as 0.
    fn read_orientation(path: &Path) -> Orientation {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(_) => return Orientation::Deg0,
        };
        let mut reader = BufReader::new(file);
        let parsed = match exif::Reader::new().read_from_container(&mut reader) {
            Ok(p) => p,
            Err(_) => return Orientation::Deg0,
        };
        let value = parsed
            .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|f| f.value.get_uint(0));
        match value {
            Some(3) => Orientation::Deg180,
            Some(6) => Orientation::Deg90,
            Some(8) => Orientation::Deg270,
            _ => Orientation::Deg0,
        }
    }

    /// Ids are root-relative paths and must stay under the root once
    /// resolved; an id that escapes (e.g. via `..`) is treated as
    /// unknown.
    fn resolves_under_root(&self, path: &Path) -> bool {
        match (self.root.canonicalize(), path.canonicalize()) {
            (Ok(root), Ok(resolved)) => resolved.starts_with(&root),
            _ => false,
        }
    }
}

impl MediaIndex for FsMediaIndex {
    fn list_entries(&self) -> Result<Vec<IndexEntry>, IndexError> {
        if !self.root.is_dir() {
            return Err(IndexError::Unavailable(format!(
                "{:?} is not a directory",
                self.root
            )));
        }

        let mut discovered: Vec<(i64, IndexEntry)> = Vec::new();

        for entry in WalkDir::new(&self.root).into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_dir() {
                continue;
            }
            let path = entry.path();
            if !Self::is_image(path) {
                continue;
            }

            let mtime = match entry.metadata() {
                Ok(meta) => meta
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_secs() as i64)
                    .unwrap_or(0),
                Err(e) => {
                    warn!(?path, error = %e, "Failed to read file metadata");
                    continue;
                }
            };

            let (width, height) = Self::probe_dimensions(path);
            let orientation = Self::read_orientation(path);
            trace!(?path, width, height, ?orientation, "Discovered image");

            discovered.push((
                mtime,
                IndexEntry {
                    id: self.id_for(path),
                    width,
                    height,
                    orientation,
                },
            ));
        }

        // Newest first; ties break on id for a stable order.
        discovered.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id)));

        let entries: Vec<IndexEntry> = discovered.into_iter().map(|(_, e)| e).collect();
        debug!(count = entries.len(), root = ?self.root, "Listed media index");
        Ok(entries)
    }

    fn open_bytes(&self, id: &str) -> Result<Vec<u8>, IndexError> {
        let path = self.root.join(id);
        if !path.is_file() || !self.resolves_under_root(&path) {
            return Err(IndexError::NotFound(id.to_string()));
        }
        Ok(std::fs::read(&path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_png(path: &Path, width: u32, height: u32) {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        img.save_with_format(path, image::ImageFormat::Png).unwrap();
    }

    #[test]
    fn test_lists_only_images() {
        let dir = tempdir().unwrap();
        write_png(&dir.path().join("a.png"), 8, 6);
        write_png(&dir.path().join("b.png"), 4, 4);
        fs::write(dir.path().join("notes.txt"), b"not an image").unwrap();

        let index = FsMediaIndex::new(dir.path());
        let entries = index.list_entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.id.ends_with(".png")));
    }

    #[test]
    fn test_reports_probed_dimensions() {
        let dir = tempdir().unwrap();
        write_png(&dir.path().join("wide.png"), 32, 8);

        let index = FsMediaIndex::new(dir.path());
        let entries = index.list_entries().unwrap();
        assert_eq!((entries[0].width, entries[0].height), (32, 8));
        assert_eq!(entries[0].orientation, Orientation::Deg0);
    }

    #[test]
    fn test_broken_file_keeps_placeholder_dimensions() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.jpg"), b"not a real jpeg").unwrap();

        let index = FsMediaIndex::new(dir.path());
        let entries = index.list_entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!((entries[0].width, entries[0].height), (0, 0));
    }

    #[test]
    fn test_open_bytes_round_trip() {
        let dir = tempdir().unwrap();
        write_png(&dir.path().join("a.png"), 8, 6);

        let index = FsMediaIndex::new(dir.path());
        let entries = index.list_entries().unwrap();
        let bytes = index.open_bytes(&entries[0].id).unwrap();
        assert_eq!(bytes, fs::read(dir.path().join("a.png")).unwrap());
    }

    #[test]
    fn test_open_bytes_rejects_escaping_id() {
        let dir = tempdir().unwrap();
        let album = dir.path().join("album");
        fs::create_dir(&album).unwrap();
        write_png(&dir.path().join("outside.png"), 2, 2);

        let index = FsMediaIndex::new(&album);
        assert!(matches!(
            index.open_bytes("../outside.png"),
            Err(IndexError::NotFound(_))
        ));
    }

    #[test]
    fn test_open_bytes_missing_id() {
        let dir = tempdir().unwrap();
        let index = FsMediaIndex::new(dir.path());
        assert!(matches!(
            index.open_bytes("ghost.png"),
            Err(IndexError::NotFound(_))
        ));
    }

    #[test]
    fn test_missing_root_is_unavailable() {
        let index = FsMediaIndex::new("/nonexistent/photogrid-root");
        assert!(matches!(
            index.list_entries(),
            Err(IndexError::Unavailable(_))
        ));
    }

    #[test]
    fn test_recursive_discovery() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("album");
        fs::create_dir(&nested).unwrap();
        write_png(&dir.path().join("root.png"), 2, 2);
        write_png(&nested.join("inner.png"), 2, 2);

        let index = FsMediaIndex::new(dir.path());
        let entries = index.list_entries().unwrap();
        assert_eq!(entries.len(), 2);
    }
}
