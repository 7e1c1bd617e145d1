//! Filesystem-backed object store.
//!
//! Layout under the storage root:
//!
//! ```text
//! <root>/.metal-staging/              buckets being created
//! <root>/<bucket>/.metal/bucket.json   creation date and owner
//! <root>/<bucket>/.metal/.tmp*         in-flight writes
//! <root>/<bucket>/objects/a%2F/b%2F/c  object `a/b/c`
//! ```
//!
//! Key segments are percent-escaped on disk. Directories standing for a key
//! prefix carry a trailing `%2F`, which an escaped segment never contains,
//! so `a` and `a/b` can be stored side by side.
//!
//! Every write lands in a temporary file inside the bucket and is renamed
//! into place, so readers never observe a partially written object. New
//! buckets are assembled under the staging directory and renamed into the
//! root in one step.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use metalstack_sync::NamedMutexRegistry;
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{
    BucketInfo, BucketStore, ObjectInfo, ObjectStore, StoreError, StoreResult, StoredObject,
    compute_etag,
};

const META_DIR: &str = ".metal";
const BUCKET_METADATA_FILE: &str = "bucket.json";
const OBJECTS_DIR: &str = "objects";
const STAGING_DIR: &str = ".metal-staging";

/// Suffix of directories holding the keys below a prefix.
const PREFIX_MARKER: &str = "%2F";

/// `%` is escaped so that [`PREFIX_MARKER`] never appears in an escaped segment.
const SEGMENT_ESCAPES: &AsciiSet = &CONTROLS.add(b'%').add(b'/');

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BucketMetadata {
    creation_date: DateTime<Utc>,
    owner: String,
}

/// Object store persisting buckets as directories under a root.
#[derive(Debug)]
pub struct FsObjectStore {
    root: PathBuf,
    owner: String,
    locks: Arc<NamedMutexRegistry>,
}

impl FsObjectStore {
    /// Open (creating if needed) a store rooted at `root`. New buckets are
    /// recorded as owned by `owner`.
    pub async fn open(root: impl Into<PathBuf>, owner: impl Into<String>) -> StoreResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(io_error("create storage root", &root))?;
        debug!(root = %root.display(), "opened filesystem object store");
        Ok(Self {
            root,
            owner: owner.into(),
            locks: Arc::new(NamedMutexRegistry::new()),
        })
    }

    /// The storage root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, name: &str) -> StoreResult<PathBuf> {
        check_bucket_name(name)?;
        Ok(self.root.join(name))
    }

    async fn read_bucket(&self, name: &str) -> StoreResult<Option<BucketInfo>> {
        let path = self
            .bucket_dir(name)?
            .join(META_DIR)
            .join(BUCKET_METADATA_FILE);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error("read bucket metadata", &path)(e)),
        };
        let meta: BucketMetadata = serde_json::from_slice(&raw)
            .map_err(|source| StoreError::Metadata { path, source })?;
        Ok(Some(BucketInfo {
            name: name.to_owned(),
            creation_date: meta.creation_date,
            owner: meta.owner,
        }))
    }

    fn open_bucket(&self, name: &str) -> StoreResult<FsBucket> {
        let dir = self.bucket_dir(name)?;
        Ok(FsBucket {
            name: name.to_owned(),
            objects_dir: dir.join(OBJECTS_DIR),
            tmp_dir: dir.join(META_DIR),
            locks: Arc::clone(&self.locks),
        })
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn list_buckets(&self) -> StoreResult<Vec<BucketInfo>> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(io_error("read storage root", &self.root))?;

        let mut buckets = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(io_error("read storage root", &self.root))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                warn!(path = %entry.path().display(), "skipping non-UTF-8 bucket directory");
                continue;
            };
            if check_bucket_name(&name).is_err() {
                continue;
            }
            if let Some(info) = self.read_bucket(&name).await? {
                buckets.push(info);
            }
        }
        Ok(buckets)
    }

    async fn get_bucket(
        &self,
        name: &str,
    ) -> StoreResult<Option<(Arc<dyn BucketStore>, BucketInfo)>> {
        let Some(info) = self.read_bucket(name).await? else {
            return Ok(None);
        };
        let bucket: Arc<dyn BucketStore> = Arc::new(self.open_bucket(name)?);
        Ok(Some((bucket, info)))
    }

    async fn create_bucket(&self, name: &str) -> StoreResult<BucketInfo> {
        let dir = self.bucket_dir(name)?;

        let staging_root = self.root.join(STAGING_DIR);
        tokio::fs::create_dir_all(&staging_root)
            .await
            .map_err(io_error("create staging directory", &staging_root))?;
        // Removed on drop unless renamed into place.
        let staging = tempfile::Builder::new()
            .prefix(".bucket")
            .tempdir_in(&staging_root)
            .map_err(io_error("create staging directory", &staging_root))?;

        let meta_dir = staging.path().join(META_DIR);
        let objects_dir = staging.path().join(OBJECTS_DIR);
        for path in [&meta_dir, &objects_dir] {
            tokio::fs::create_dir_all(path)
                .await
                .map_err(io_error("create bucket directory", path))?;
        }

        let meta = BucketMetadata {
            creation_date: Utc::now(),
            owner: self.owner.clone(),
        };
        let meta_path = meta_dir.join(BUCKET_METADATA_FILE);
        let encoded = serde_json::to_vec_pretty(&meta).map_err(|source| StoreError::Metadata {
            path: meta_path.clone(),
            source,
        })?;
        write_atomic(&meta_dir, &meta_path, Bytes::from(encoded)).await?;

        match tokio::fs::rename(staging.path(), &dir).await {
            Ok(()) => {
                let _ = staging.keep();
            }
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::DirectoryNotEmpty
                ) =>
            {
                return Err(StoreError::AlreadyExists {
                    bucket: name.to_owned(),
                });
            }
            Err(e) => return Err(io_error("publish bucket directory", &dir)(e)),
        }

        debug!(bucket = %name, dir = %dir.display(), "created bucket");
        Ok(BucketInfo {
            name: name.to_owned(),
            creation_date: meta.creation_date,
            owner: meta.owner,
        })
    }
}

#[derive(Debug)]
struct FsBucket {
    name: String,
    objects_dir: PathBuf,
    tmp_dir: PathBuf,
    locks: Arc<NamedMutexRegistry>,
}

impl FsBucket {
    /// Map a key onto a path below the objects directory.
    fn object_path(&self, key: &str) -> StoreResult<PathBuf> {
        if key.starts_with('/') {
            return Err(invalid_key(key, "absolute key"));
        }
        let mut path = self.objects_dir.clone();
        let mut segments = key.split('/').peekable();
        while let Some(segment) = segments.next() {
            check_segment(key, segment)?;
            let escaped = utf8_percent_encode(segment, SEGMENT_ESCAPES).to_string();
            if segments.peek().is_some() {
                path.push(format!("{escaped}{PREFIX_MARKER}"));
            } else {
                path.push(escaped);
            }
        }
        Ok(path)
    }
}

#[async_trait]
impl BucketStore for FsBucket {
    async fn list_objects(&self) -> StoreResult<Vec<ObjectInfo>> {
        let mut objects = Vec::new();
        let mut pending = vec![(self.objects_dir.clone(), String::new())];

        while let Some((dir, prefix)) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(io_error("list objects", &dir)(e)),
            };
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(io_error("list objects", &dir))?
            {
                let path = entry.path();
                let Ok(name) = entry.file_name().into_string() else {
                    warn!(path = %path.display(), "skipping non-UTF-8 object path");
                    continue;
                };
                let meta = entry
                    .metadata()
                    .await
                    .map_err(io_error("stat object", &path))?;
                if meta.is_dir() {
                    let Some(segment) = name.strip_suffix(PREFIX_MARKER).and_then(unescape) else {
                        warn!(path = %path.display(), "skipping unrecognised object directory");
                        continue;
                    };
                    pending.push((path, format!("{prefix}{segment}/")));
                } else if meta.is_file() {
                    let Some(segment) = unescape(&name) else {
                        warn!(path = %path.display(), "skipping unrecognised object file");
                        continue;
                    };
                    let key = format!("{prefix}{segment}");
                    objects.push(ObjectInfo {
                        key,
                        last_modified: modified_time(&meta),
                        size: meta.len(),
                        etag: None,
                    });
                }
            }
        }

        Ok(objects)
    }

    async fn get_object(&self, key: &str) -> StoreResult<Option<StoredObject>> {
        let path = self.object_path(key)?;
        let meta = match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error("stat object", &path)(e)),
        };
        let data = match tokio::fs::read(&path).await {
            Ok(data) => Bytes::from(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error("read object", &path)(e)),
        };

        Ok(Some(StoredObject {
            info: ObjectInfo {
                key: key.to_owned(),
                last_modified: modified_time(&meta),
                size: data.len() as u64,
                etag: Some(compute_etag(&data)),
            },
            data,
        }))
    }

    async fn put_object(&self, key: &str, data: Bytes) -> StoreResult<ObjectInfo> {
        let path = self.object_path(key)?;
        let _guard = self.locks.lock(&path.to_string_lossy()).await;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(io_error("create object directory", parent))?;
        }

        let etag = compute_etag(&data);
        let size = data.len() as u64;
        write_atomic(&self.tmp_dir, &path, data).await?;

        let last_modified = match tokio::fs::metadata(&path).await {
            Ok(meta) => modified_time(&meta),
            Err(_) => Utc::now(),
        };
        debug!(bucket = %self.name, key = %key, size, "stored object");

        Ok(ObjectInfo {
            key: key.to_owned(),
            last_modified,
            size,
            etag: Some(etag),
        })
    }
}

/// Write `data` to a temporary file in `tmp_dir`, then rename it to `dest`.
async fn write_atomic(tmp_dir: &Path, dest: &Path, data: Bytes) -> StoreResult<()> {
    let tmp_dir = tmp_dir.to_path_buf();
    let dest = dest.to_path_buf();
    let task_dest = dest.clone();

    tokio::task::spawn_blocking(move || -> StoreResult<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(&tmp_dir)
            .map_err(io_error("create temp file", &tmp_dir))?;
        tmp.write_all(&data)
            .map_err(io_error("write temp file", tmp.path()))?;
        tmp.as_file()
            .sync_all()
            .map_err(io_error("sync temp file", tmp.path()))?;
        tmp.persist(&task_dest)
            .map_err(|e| io_error("rename temp file", &task_dest)(e.error))?;
        Ok(())
    })
    .await
    .map_err(|e| io_error("join write task", &dest)(io::Error::other(e)))?
}

fn check_segment(key: &str, segment: &str) -> StoreResult<()> {
    match segment {
        "" => Err(invalid_key(key, "empty path segment")),
        "." | ".." => Err(invalid_key(key, "relative path segment")),
        s if s.contains('/') => Err(invalid_key(key, "path separator")),
        _ => Ok(()),
    }
}

fn check_bucket_name(name: &str) -> StoreResult<()> {
    if name == STAGING_DIR {
        return Err(invalid_key(name, "reserved name"));
    }
    check_segment(name, name)
}

fn unescape(name: &str) -> Option<String> {
    percent_decode_str(name)
        .decode_utf8()
        .ok()
        .map(std::borrow::Cow::into_owned)
}

fn invalid_key(key: &str, reason: &str) -> StoreError {
    StoreError::InvalidKey {
        key: key.to_owned(),
        reason: reason.to_owned(),
    }
}

fn io_error(op: &'static str, path: &Path) -> impl FnOnce(io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { op, path, source }
}

fn modified_time(meta: &std::fs::Metadata) -> DateTime<Utc> {
    meta.modified().map_or_else(|_| Utc::now(), DateTime::<Utc>::from)
}
