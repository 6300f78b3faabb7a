//! Index record tying a file id to its folder and original filename.

use serde::{Deserialize, Serialize};

/// Value stored in the metadata index under a file id.
///
/// Stored as structured JSON so folder and filename may contain any
/// characters without an escaping ambiguity.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FileRecord {
    /// Caller-supplied folder the object was uploaded under.
    pub folder: String,

    /// Original client-supplied filename.
    pub filename: String,
}

impl FileRecord {
    /// Storage key of the object this record points at.
    pub fn storage_key(&self, file_id: &str) -> String {
        format!("{}/{}", self.folder, file_id)
    }
}
