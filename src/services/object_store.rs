//! ObjectStore — blob storage backed by local disk for payloads and SQLite
//! for object headers. Payloads live beneath `base_path/{bucket}/{key}`
//! where the key is `<folder>/<id>`; headers (size, content type, etag,
//! last-modified) live in the `objects` table so stat calls never touch the
//! payload.

use crate::models::object::ObjectStat;
use bytes::Bytes;
use chrono::Utc;
use md5::Context;
use sqlx::SqlitePool;
use std::{
    io::{self, ErrorKind},
    path::PathBuf,
    sync::Arc,
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object `{0}` not found")]
    ObjectNotFound(String),
    #[error("invalid storage key")]
    InvalidKey,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

const MAX_KEY_LEN: usize = 1024;

/// ObjectStore provides single-shot blob operations:
/// - Put an object (writes bytes to disk and upserts a header row)
/// - Stat an object (header row only, payload untouched)
/// - Get an object (header row plus an opened payload reader)
///
/// No encryption, versioning, or multipart handling; the payload length is
/// always known before a write begins.
#[derive(Clone)]
pub struct ObjectStore {
    /// Shared SQLite connection pool used for header rows.
    pub db: Arc<SqlitePool>,

    /// Base directory on disk where payloads are stored.
    pub base_path: PathBuf,

    /// Bucket name; all keys live under this single bucket.
    bucket: String,
}

impl ObjectStore {
    /// Create a new ObjectStore writing payloads under `base_path/{bucket}`.
    pub fn new(db: Arc<SqlitePool>, base_path: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            db,
            base_path: base_path.into(),
            bucket: bucket.into(),
        }
    }

    /// Idempotently provision the bucket directory. Called once at startup.
    pub async fn ensure_bucket(&self) -> StoreResult<()> {
        fs::create_dir_all(self.bucket_root()).await?;
        Ok(())
    }

    fn bucket_root(&self) -> PathBuf {
        self.base_path.join(&self.bucket)
    }

    /// Construct the payload path for a key. Parent directories may not
    /// exist yet.
    fn object_path(&self, key: &str) -> PathBuf {
        self.bucket_root().join(key)
    }

    /// Write an object and record its headers.
    ///
    /// Bytes go to a temporary file first, then an fsync and an atomic
    /// rename into the final location; the header row is upserted with
    /// overwrite semantics. The temp file is removed on any failure.
    pub async fn put_object(
        &self,
        key: &str,
        content_type: Option<String>,
        data: Bytes,
    ) -> StoreResult<ObjectStat> {
        ensure_key_safe(key)?;

        let file_path = self.object_path(key);
        let parent = file_path
            .parent()
            .map(PathBuf::from)
            .ok_or_else(|| StoreError::Io(io::Error::other("object path missing parent directory")))?;
        fs::create_dir_all(&parent).await?;
        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));

        let mut digest = Context::new();
        digest.consume(&data);
        let etag = format!("{:x}", digest.compute());
        let size_bytes = data.len() as i64;

        let mut file = File::create(&tmp_path).await?;
        if let Err(err) = file.write_all(&data).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }
        if let Err(err) = file.flush().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }
        if let Err(err) = file.sync_all().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }

        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(&file_path).await?;
                fs::rename(&tmp_path, &file_path).await?;
            } else {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StoreError::Io(err));
            }
        }

        let last_modified = Utc::now();
        let insert_result = sqlx::query_as::<_, ObjectStat>(
            r#"
            INSERT INTO objects (key, content_type, size_bytes, etag, last_modified)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                content_type = excluded.content_type,
                size_bytes = excluded.size_bytes,
                etag = excluded.etag,
                last_modified = excluded.last_modified
            RETURNING key, content_type, size_bytes, etag, last_modified
            "#,
        )
        .bind(key)
        .bind(content_type)
        .bind(size_bytes)
        .bind(&etag)
        .bind(last_modified)
        .fetch_one(&*self.db)
        .await;

        match insert_result {
            Ok(stat) => Ok(stat),
            Err(err) => {
                let _ = fs::remove_file(&file_path).await;
                Err(StoreError::Sqlx(err))
            }
        }
    }

    /// Fetch only object headers.
    pub async fn stat_object(&self, key: &str) -> StoreResult<ObjectStat> {
        ensure_key_safe(key)?;
        sqlx::query_as::<_, ObjectStat>(
            "SELECT key, content_type, size_bytes, etag, last_modified
             FROM objects WHERE key = ?",
        )
        .bind(key)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => StoreError::ObjectNotFound(key.to_string()),
            other => StoreError::Sqlx(other),
        })
    }

    /// Fetch an object for reading.
    ///
    /// Returns headers and an opened File handle ready for streaming out.
    /// Returns ObjectNotFound if headers exist but the payload is missing.
    pub async fn get_object(&self, key: &str) -> StoreResult<(ObjectStat, File)> {
        let stat = self.stat_object(key).await?;

        let file_path = self.object_path(key);
        let file = File::open(&file_path).await.map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                StoreError::ObjectNotFound(key.to_string())
            } else {
                StoreError::Io(err)
            }
        })?;

        Ok((stat, file))
    }
}

/// Basic key validation to avoid trivial path traversal vectors.
///
/// Rejects keys that are empty, over-long, begin with `/`, contain `..`,
/// or carry control bytes or backslashes.
pub fn ensure_key_safe(key: &str) -> StoreResult<()> {
    if key.is_empty() || key.len() > MAX_KEY_LEN {
        return Err(StoreError::InvalidKey);
    }
    if key.starts_with('/') || key.contains("..") {
        return Err(StoreError::InvalidKey);
    }
    if key
        .bytes()
        .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
    {
        return Err(StoreError::InvalidKey);
    }
    Ok(())
}

/// Validate a caller-supplied folder before it is composed into a key.
///
/// Same rules as [`ensure_key_safe`]; the original accepted folder verbatim,
/// this gateway rejects traversal-shaped values up front.
pub fn ensure_folder_safe(folder: &str) -> StoreResult<()> {
    ensure_key_safe(folder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_store() -> ObjectStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::services::apply_migrations(&pool).await.unwrap();

        let base = std::env::temp_dir().join(format!("object-store-test-{}", Uuid::new_v4()));
        let store = ObjectStore::new(Arc::new(pool), base, "files");
        store.ensure_bucket().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let store = test_store().await;

        let stat = store
            .put_object("docs/abc", Some("text/plain".into()), Bytes::from_static(b"hello"))
            .await
            .unwrap();
        assert_eq!(stat.size_bytes, 5);
        assert_eq!(stat.content_type.as_deref(), Some("text/plain"));

        let (stat, mut file) = store.get_object("docs/abc").await.unwrap();
        assert_eq!(stat.key, "docs/abc");

        let mut body = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut file, &mut body)
            .await
            .unwrap();
        assert_eq!(body, b"hello");
    }

    #[tokio::test]
    async fn test_put_overwrites_headers() {
        let store = test_store().await;

        store
            .put_object("docs/abc", None, Bytes::from_static(b"hello"))
            .await
            .unwrap();
        let stat = store
            .put_object("docs/abc", Some("text/plain".into()), Bytes::from_static(b"longer body"))
            .await
            .unwrap();

        assert_eq!(stat.size_bytes, 11);
        let stat = store.stat_object("docs/abc").await.unwrap();
        assert_eq!(stat.size_bytes, 11);
        assert_eq!(stat.content_type.as_deref(), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_stat_missing_object() {
        let store = test_store().await;
        let err = store.stat_object("docs/missing").await.unwrap_err();
        assert!(matches!(err, StoreError::ObjectNotFound(_)));
    }

    #[test]
    fn test_key_safety() {
        assert!(ensure_key_safe("docs/abc").is_ok());
        assert!(ensure_key_safe("").is_err());
        assert!(ensure_key_safe("/docs/abc").is_err());
        assert!(ensure_key_safe("../etc/passwd").is_err());
        assert!(ensure_key_safe("docs/..").is_err());
        assert!(ensure_key_safe("docs\\abc").is_err());
        assert!(ensure_key_safe("docs\0abc").is_err());
    }
}
