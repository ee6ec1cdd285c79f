//! File-backed credential store
//!
//! Persists credentials as a JSON document keyed by origin, so several
//! portal deployments can share one file without seeing each other's session:
//!
//! ```json
//! { "https://portal.example": { "authToken": "...", "authTokenExpiry": "...", "authRoles": "..." } }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::credentials::{CredentialStore, StoredCredentials};
use crate::domain::token::RoleSet;

type Document = BTreeMap<String, BTreeMap<String, String>>;

/// CredentialStore persisted to a JSON file, scoped by origin
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    origin: String,
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>, origin: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            origin: origin.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    fn read_document(&self) -> Document {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Document::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read credential file");
                return Document::new();
            }
        };

        if contents.trim().is_empty() {
            return Document::new();
        }

        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "Ignoring unreadable credential file");
            Document::new()
        })
    }

    fn write_document(&self, document: &Document) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(document).map_err(io::Error::other)?;

        // Write to a sibling file first so a crash never leaves a half-written document
        let tmp = self.path.with_extension(format!("{}.tmp", Uuid::new_v4()));
        let result = write_private(&tmp, json.as_bytes()).and_then(|()| fs::rename(&tmp, &self.path));

        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result
    }

    fn update(&self, apply: impl FnOnce(&mut Document)) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut document = self.read_document();
        apply(&mut document);

        if let Err(e) = self.write_document(&document) {
            warn!(path = %self.path.display(), error = %e, "Failed to write credential file");
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> StoredCredentials {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.read_document()
            .get(&self.origin)
            .map(StoredCredentials::from_entries)
            .unwrap_or_default()
    }

    fn set(&self, token: &str, expires_at_ms: Option<i64>, roles: &RoleSet) {
        let entries = StoredCredentials::new(token, expires_at_ms, roles.clone()).to_entries();
        debug!(origin = %self.origin, "Persisting session credentials");

        self.update(|document| {
            document.insert(self.origin.clone(), entries);
        });
    }

    fn clear(&self) {
        debug!(origin = %self.origin, "Clearing session credentials");

        self.update(|document| {
            document.remove(&self.origin);
        });
    }
}

/// Create `path` readable by the owner only; the document holds a bearer token
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}
