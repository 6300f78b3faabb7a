//! Header metadata for an object held by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Headers recorded for a stored object.
///
/// The payload bytes live on disk; this row is what `stat` and download
/// responses are built from.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct ObjectStat {
    /// Storage key within the bucket (`<folder>/<id>`).
    pub key: String,

    /// Content type (MIME type) declared by the uploader.
    pub content_type: Option<String>,

    /// Size in bytes.
    pub size_bytes: i64,

    /// MD5 checksum of the payload.
    pub etag: Option<String>,

    /// Timestamp when the object was last written.
    pub last_modified: DateTime<Utc>,
}
