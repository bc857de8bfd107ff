//! Owner id to storage key mapping.
//!
//! Owner ids that are already safe file stems are used verbatim so a data
//! directory stays readable (`76561198000000000.json`). Anything else is
//! hashed into a second namespace marked with a leading `~`:
//!
//! - direct: `[A-Za-z0-9_-]{1,128}` + `.json`
//! - hashed: `~` + BLAKE3 hex of the id + `.json`
//!
//! `~` is never a direct-name character, so the two namespaces cannot
//! overlap.

use garage_types::OwnerId;

/// File extension for record documents.
pub const DOCUMENT_EXTENSION: &str = "json";

/// Longest owner id stored under its own name.
const MAX_DIRECT_LEN: usize = 128;

const HASHED_PREFIX: char = '~';

fn is_direct_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Derive the document name for `owner`.
///
/// # Examples
///
/// ```
/// use garage_store::keys::storage_key;
/// use garage_types::OwnerId;
///
/// let plain = OwnerId::new("76561198000000000").unwrap();
/// assert_eq!(storage_key(&plain), "76561198000000000.json");
///
/// let odd = OwnerId::new("../etc/passwd").unwrap();
/// assert!(storage_key(&odd).starts_with('~'));
/// ```
pub fn storage_key(owner: &OwnerId) -> String {
    let raw = owner.as_str();
    if raw.len() <= MAX_DIRECT_LEN && raw.chars().all(is_direct_char) {
        format!("{raw}.{DOCUMENT_EXTENSION}")
    } else {
        let digest = blake3::hash(raw.as_bytes());
        format!("{HASHED_PREFIX}{}.{DOCUMENT_EXTENSION}", digest.to_hex())
    }
}
