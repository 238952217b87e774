//! On-disk layout of an album package.
//!
//! Every stage agrees on where things live through [`PackageLayout`]:
//!
//! ```text
//! <root>/
//! ├── collection/
//! │   ├── MC-001.jsonld.json               # collection descriptor
//! │   └── MC-001/
//! │       └── labels.jsonld.json           # subject label service
//! └── items/
//!     ├── MC-001.jsonld.json               # item descriptor
//!     └── MC-001/
//!         ├── media.jsonld.json            # media direct-container
//!         └── media/
//!             ├── MC-001.pdf               # PDFs (+ .pdf.jsonld.json)
//!             ├── images.jsonld.json       # image list container
//!             └── images/
//!                 ├── MC-001_0001.tif
//!                 └── MC-001_0001.tif.jsonld.json
//! ```

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Suffix shared by every descriptor document.
pub const DOCUMENT_SUFFIX: &str = ".jsonld.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout {
    root: PathBuf,
    collection_id: String,
}

impl PackageLayout {
    pub fn new(root: impl Into<PathBuf>, collection_id: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            collection_id: collection_id.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }

    pub fn collection_dir(&self) -> PathBuf {
        self.root.join("collection").join(&self.collection_id)
    }

    pub fn collection_document(&self) -> PathBuf {
        self.root
            .join("collection")
            .join(format!("{}{DOCUMENT_SUFFIX}", self.collection_id))
    }

    pub fn labels_document(&self) -> PathBuf {
        self.collection_dir().join(format!("labels{DOCUMENT_SUFFIX}"))
    }

    pub fn item_dir(&self) -> PathBuf {
        self.root.join("items").join(&self.collection_id)
    }

    pub fn item_document(&self) -> PathBuf {
        self.root
            .join("items")
            .join(format!("{}{DOCUMENT_SUFFIX}", self.collection_id))
    }

    pub fn media_container(&self) -> PathBuf {
        self.item_dir().join(format!("media{DOCUMENT_SUFFIX}"))
    }

    pub fn media_dir(&self) -> PathBuf {
        self.item_dir().join("media")
    }

    pub fn image_list_container(&self) -> PathBuf {
        self.media_dir().join(format!("images{DOCUMENT_SUFFIX}"))
    }

    pub fn images_dir(&self) -> PathBuf {
        self.media_dir().join("images")
    }

    /// Page descriptor documents (`*.tif.jsonld.json`), sorted by file name.
    ///
    /// Returns an empty list when the images directory does not exist.
    pub fn page_documents(&self) -> Vec<PathBuf> {
        files_with_extension(&self.images_dir(), "tif.jsonld.json")
    }
}

/// Document path for a media file: `photo.tif` → `photo.tif.jsonld.json`.
pub fn document_path_for(media: &Path) -> PathBuf {
    let mut name = media.as_os_str().to_owned();
    name.push(DOCUMENT_SUFFIX);
    PathBuf::from(name)
}

/// The per-document key used in target URLs: the file name without the
/// `.jsonld.json` suffix.
pub fn document_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.strip_suffix(DOCUMENT_SUFFIX) {
        Some(stem) => stem.to_string(),
        None => name,
    }
}

/// Regular files directly inside `dir` whose name ends with `.{extension}`
/// (ASCII case-insensitive), sorted by file name.
///
/// A missing or unreadable directory yields an empty list.
pub fn files_with_extension(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let suffix = format!(".{}", extension.to_ascii_lowercase());
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.file_name()
                .to_string_lossy()
                .to_ascii_lowercase()
                .ends_with(&suffix)
        })
        .map(|e| e.into_path())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn paths_follow_convention() {
        let layout = PackageLayout::new("/pkg", "MC-001");
        assert_eq!(
            layout.collection_document(),
            Path::new("/pkg/collection/MC-001.jsonld.json")
        );
        assert_eq!(
            layout.labels_document(),
            Path::new("/pkg/collection/MC-001/labels.jsonld.json")
        );
        assert_eq!(
            layout.item_document(),
            Path::new("/pkg/items/MC-001.jsonld.json")
        );
        assert_eq!(
            layout.media_container(),
            Path::new("/pkg/items/MC-001/media.jsonld.json")
        );
        assert_eq!(
            layout.image_list_container(),
            Path::new("/pkg/items/MC-001/media/images.jsonld.json")
        );
        assert_eq!(
            layout.images_dir(),
            Path::new("/pkg/items/MC-001/media/images")
        );
    }

    #[test]
    fn document_path_appends_suffix() {
        assert_eq!(
            document_path_for(Path::new("/a/MC-001_0001.tif")),
            Path::new("/a/MC-001_0001.tif.jsonld.json")
        );
    }

    #[test]
    fn document_stem_strips_suffix() {
        assert_eq!(
            document_stem(Path::new("items/MC-001.jsonld.json")),
            "MC-001"
        );
        assert_eq!(
            document_stem(Path::new("images/MC-001_0002.tif.jsonld.json")),
            "MC-001_0002.tif"
        );
        assert_eq!(document_stem(Path::new("plain.json")), "plain.json");
    }

    #[test]
    fn files_with_extension_is_case_insensitive_and_sorted() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b_0002.TIF"), "").unwrap();
        fs::write(tmp.path().join("a_0001.tif"), "").unwrap();
        fs::write(tmp.path().join("notes.txt"), "").unwrap();
        fs::create_dir(tmp.path().join("dir.tif")).unwrap();

        let names: Vec<String> = files_with_extension(tmp.path(), "tif")
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a_0001.tif", "b_0002.TIF"]);
    }

    #[test]
    fn files_with_extension_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(files_with_extension(&tmp.path().join("nope"), "tif").is_empty());
    }

    #[test]
    fn page_documents_only_lists_tiff_descriptors() {
        let tmp = TempDir::new().unwrap();
        let layout = PackageLayout::new(tmp.path(), "MC-001");
        fs::create_dir_all(layout.images_dir()).unwrap();
        for name in [
            "MC-001_0002.tif.jsonld.json",
            "MC-001_0001.tif.jsonld.json",
            "MC-001_0001.tif",
            "other.pdf.jsonld.json",
        ] {
            fs::write(layout.images_dir().join(name), "{}").unwrap();
        }

        let names: Vec<String> = layout
            .page_documents()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["MC-001_0001.tif.jsonld.json", "MC-001_0002.tif.jsonld.json"]
        );
    }
}
