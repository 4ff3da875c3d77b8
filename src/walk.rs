//! Filesystem document supplier for the command-line binary.
//!
//! Walks a directory tree with [`walkdir`], skips hidden entries, and hands
//! each regular file to the scanner as a [`FileDocument`]. The walker also
//! decides the type hint for files the scanner should not read line by line:
//! archives, binaries and notice files are classified here by name, so the
//! core never has to sniff bytes it cannot interpret.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use scan::{Document, DocumentHint};

/// Extensions treated as archives rather than readable text.
const ARCHIVE_EXTENSIONS: &[&str] = &[
    "jar", "gz", "tgz", "zip", "tar", "bz", "bz2", "xz", "rar", "war", "7z",
];

/// Extensions for data, image, executable, keystore and bytecode files.
const BINARY_EXTENSIONS: &[&str] = &[
    "dat", "doc", "ncb", "idb", "suo", "xcf", "raj", "cert", "ks", "ts", "odp",
    "exe", "dll", "lib", "so", "a", "exp", "o", "bin",
    "jks", "keystore", "pem", "crl",
    "png", "pdf", "gif", "giff", "tif", "tiff", "jpg", "jpeg", "ico", "icns",
    "class", "pyd", "obj", "pyc",
    "woff", "woff2", "ttf",
];

/// File stems that hold licensing or release prose of their own.
const NOTICE_STEMS: &[&str] = &[
    "notice", "license", "licence", "copying", "copyright", "authors",
    "contributors", "changelog", "disclaimer", "keys", "readme",
    "release-notes", "release_notes", "status", "building", "install",
    "news", "upgrade", "third_party_notices",
];

/// Extensions that mark a sidecar notice for some other file.
const NOTICE_EXTENSIONS: &[&str] = &["license", "notice"];

/// Lock files and minified assets are generated, not authored.
const GENERATED_NAMES: &[&str] = &[
    "package-lock.json", "yarn.lock", "cargo.lock", "go.sum", "gemfile.lock",
];
const GENERATED_SUFFIXES: &[&str] = &[".min.js", ".min.css"];

/// One file on disk, named by its path relative to the walk root.
pub struct FileDocument {
    path: PathBuf,
    name: String,
    hint: DocumentHint,
}

impl FileDocument {
    /// Wraps `path`, naming it relative to `root` with `/` separators.
    pub fn new(root: &Path, path: PathBuf) -> Self {
        let relative = path.strip_prefix(root).unwrap_or(&path);
        let name = relative
            .components()
            .map(|part| part.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let hint = hint_for(&path);
        FileDocument { path, name, hint }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Document for FileDocument {
    fn name(&self) -> &str {
        &self.name
    }

    fn hint(&self) -> DocumentHint {
        self.hint
    }

    fn reader(&mut self) -> io::Result<Box<dyn BufRead + '_>> {
        let file = File::open(&self.path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Classifies a path by name alone.
fn hint_for(path: &Path) -> DocumentHint {
    let file_name = match path.file_name() {
        Some(name) => name.to_string_lossy().to_ascii_lowercase(),
        None => return DocumentHint::Standard,
    };
    if file_name == "manifest.mf" {
        return DocumentHint::Binary;
    }
    if GENERATED_NAMES.contains(&file_name.as_str())
        || GENERATED_SUFFIXES.iter().any(|s| file_name.ends_with(s))
    {
        return DocumentHint::Generated;
    }
    let (stem, extension) = match file_name.rsplit_once('.') {
        Some((stem, extension)) => (stem, Some(extension)),
        None => (file_name.as_str(), None),
    };
    if NOTICE_STEMS.contains(&file_name.as_str())
        || NOTICE_STEMS.contains(&stem)
        || extension.is_some_and(|ext| NOTICE_EXTENSIONS.contains(&ext))
    {
        return DocumentHint::Notice;
    }
    match extension {
        Some(ext) if ARCHIVE_EXTENSIONS.contains(&ext) => DocumentHint::Archive,
        Some(ext) if BINARY_EXTENSIONS.contains(&ext) => DocumentHint::Binary,
        _ => DocumentHint::Standard,
    }
}

fn hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Yields every visible file under `root`, directories sorted by name so a
/// report is stable across runs. A missing root is an error; entries that
/// fail mid-walk are logged and skipped.
pub fn walk_documents(root: impl AsRef<Path>) -> io::Result<impl Iterator<Item = FileDocument>> {
    let root = root.as_ref().to_path_buf();
    std::fs::metadata(&root)?;
    let entries = WalkDir::new(root.clone())
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !hidden(entry));
    Ok(entries.filter_map(move |entry| match entry {
        Ok(entry) if entry.file_type().is_file() => {
            Some(FileDocument::new(&root, entry.into_path()))
        }
        Ok(_) => None,
        Err(err) => {
            warn!(error = %err, "walk_entry_unreadable");
            None
        }
    }))
}
