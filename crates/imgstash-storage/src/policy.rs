//! Upload policy: allow-lists and the storage naming scheme
//!
//! Two pure decisions live here, injected into the ingestion pipeline so
//! they can be substituted in tests without touching any I/O code:
//! whether a file is accepted, and what it is named on disk.

use chrono::Utc;
use rand::Rng;

/// Extensions a new upload may carry.
pub const WRITE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png"];

/// Content types a new upload may declare.
pub const WRITE_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];

/// Extensions the repository lists and searches. Deliberately broader than
/// the write list: gif/webp blobs placed in the directory out-of-band are
/// served, but cannot be newly uploaded.
pub const READ_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Accept/reject and naming rules for uploads
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    extensions: Vec<String>,
    content_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(WRITE_EXTENSIONS, WRITE_CONTENT_TYPES)
    }
}

impl UploadPolicy {
    pub fn new(extensions: &[&str], content_types: &[&str]) -> Self {
        Self {
            extensions: extensions.iter().map(|s| s.to_string()).collect(),
            content_types: content_types.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Both the extension and the declared content type must match their
    /// allow-list. Logical AND, not OR: a spoofed content type with a
    /// mismatched extension fails, and so does a correct content type with
    /// a disguised extension.
    pub fn is_accepted(&self, extension: &str, content_type: &str) -> bool {
        let extension = extension.to_lowercase();
        self.extensions.iter().any(|e| *e == extension)
            && self.content_types.iter().any(|c| *c == content_type)
    }

    /// Derive the on-disk name for an accepted upload:
    /// `{field}-{unix_millis}-{random 0..1e9}.{extension}`.
    ///
    /// Uniqueness is by construction, not by collision-checking: two calls
    /// collide only with probability ~1/1e9 within the same millisecond,
    /// which this system accepts instead of paying a uniqueness check.
    /// The format is a semi-stable contract; clients persist these names
    /// for later delete calls.
    pub fn name_for(&self, field_name: &str, extension: &str) -> String {
        let millis = Utc::now().timestamp_millis();
        let random: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
        format!(
            "{}-{}-{}.{}",
            field_name,
            millis,
            random,
            extension.to_lowercase()
        )
    }

    /// Lowercased extension of an original filename, if it has one.
    pub fn extension_of(filename: &str) -> Option<String> {
        std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }
}

/// Whether a stored filename's extension is in the read allow-list.
/// Case-insensitive; files without an extension are excluded.
pub fn is_listed(filename: &str) -> bool {
    match UploadPolicy::extension_of(filename) {
        Some(ext) => READ_EXTENSIONS.contains(&ext.as_str()),
        None => false,
    }
}
