//! The S3 provider.
//!
//! [`MetalStackS3`] turns typed operation inputs into outputs over an
//! [`ObjectStore`]. It knows nothing about HTTP; routing and XML rendering
//! live in `metalstack-s3-http`.

use std::collections::BTreeSet;
use std::sync::Arc;

use metalstack_s3_model::input::{
    CreateBucketInput, GetObjectAclInput, GetObjectInput, HeadBucketInput, HeadObjectInput,
    ListBucketsInput, ListObjectsV2Input, PutObjectInput,
};
use metalstack_s3_model::output::{
    CreateBucketOutput, GetObjectAclOutput, GetObjectOutput, HeadBucketOutput, HeadObjectOutput,
    ListBucketsOutput, ListObjectsV2Output, PutObjectOutput,
};
use metalstack_s3_model::types::{
    Bucket, CommonPrefix, Grant, Grantee, GranteeType, Object, Owner, Permission,
};
use tracing::{debug, info};

use crate::config::S3Config;
use crate::error::S3ServiceError;
use crate::store::{
    BucketInfo, BucketStore, FsObjectStore, MemoryObjectStore, ObjectStore, StoredObject,
};
use crate::validation::{validate_bucket_name, validate_object_key};

/// The S3 provider.
///
/// Cheap to clone; all state sits behind `Arc`s.
///
/// # Examples
///
/// ```
/// use metalstack_s3_core::{MetalStackS3, S3Config};
///
/// let provider = MetalStackS3::in_memory(S3Config::default());
/// assert_eq!(provider.config().owner_id, "metalstack");
/// ```
#[derive(Debug, Clone)]
pub struct MetalStackS3 {
    store: Arc<dyn ObjectStore>,
    config: Arc<S3Config>,
}

impl MetalStackS3 {
    /// Create a provider over an existing store.
    #[must_use]
    pub fn new(config: S3Config, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Create a provider backed by a fresh in-memory store.
    #[must_use]
    pub fn in_memory(config: S3Config) -> Self {
        let store = Arc::new(MemoryObjectStore::new(config.owner_id.clone()));
        Self::new(config, store)
    }

    /// Create a provider for `config`: a filesystem store when
    /// `storage_dir` is set, otherwise an in-memory one.
    pub async fn open(config: S3Config) -> Result<Self, S3ServiceError> {
        match config.storage_dir.clone() {
            Some(dir) => {
                let store = FsObjectStore::open(dir, config.owner_id.clone()).await?;
                Ok(Self::new(config, Arc::new(store)))
            }
            None => Ok(Self::in_memory(config)),
        }
    }

    /// Returns the provider configuration.
    #[must_use]
    pub fn config(&self) -> &S3Config {
        &self.config
    }

    /// Returns the underlying object store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    fn owner(&self, id: &str) -> Owner {
        let display_name = if id == self.config.owner_id {
            self.config.owner_display_name.clone()
        } else {
            None
        };
        Owner {
            id: id.to_owned(),
            display_name,
        }
    }

    async fn bucket(
        &self,
        name: &str,
    ) -> Result<(Arc<dyn BucketStore>, BucketInfo), S3ServiceError> {
        self.store
            .get_bucket(name)
            .await?
            .ok_or_else(|| S3ServiceError::NoSuchBucket {
                bucket: name.to_owned(),
            })
    }

    async fn object(&self, bucket: &str, key: &str) -> Result<StoredObject, S3ServiceError> {
        validate_object_key(key)?;
        let (store, _) = self.bucket(bucket).await?;
        store
            .get_object(key)
            .await?
            .ok_or_else(|| S3ServiceError::NoSuchKey {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
            })
    }

    /// List every bucket, sorted by name.
    pub async fn handle_list_buckets(
        &self,
        _input: ListBucketsInput,
    ) -> Result<ListBucketsOutput, S3ServiceError> {
        let mut buckets: Vec<Bucket> = self
            .store
            .list_buckets()
            .await?
            .into_iter()
            .map(|info| Bucket {
                name: info.name,
                creation_date: info.creation_date,
            })
            .collect();
        buckets.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(ListBucketsOutput {
            owner: Some(self.owner(&self.config.owner_id)),
            buckets,
        })
    }

    /// Create a bucket.
    pub async fn handle_create_bucket(
        &self,
        input: CreateBucketInput,
    ) -> Result<CreateBucketOutput, S3ServiceError> {
        validate_bucket_name(&input.bucket)?;
        let info = self.store.create_bucket(&input.bucket).await?;
        info!(bucket = %info.name, owner = %info.owner, "bucket created");
        Ok(CreateBucketOutput {
            location: Some(format!("/{}", info.name)),
        })
    }

    /// Check that a bucket exists.
    pub async fn handle_head_bucket(
        &self,
        input: HeadBucketInput,
    ) -> Result<HeadBucketOutput, S3ServiceError> {
        self.bucket(&input.bucket).await?;
        Ok(HeadBucketOutput {})
    }

    /// List the objects in a bucket, rolling keys up at the delimiter.
    pub async fn handle_list_objects_v2(
        &self,
        input: ListObjectsV2Input,
    ) -> Result<ListObjectsV2Output, S3ServiceError> {
        let (store, _) = self.bucket(&input.bucket).await?;
        let prefix = input.prefix.unwrap_or_default();
        let delimiter = input.delimiter.filter(|d| !d.is_empty());

        let mut contents = Vec::new();
        let mut common_prefixes = BTreeSet::new();
        for object in store.list_objects().await? {
            let Some(rest) = object.key.strip_prefix(prefix.as_str()) else {
                continue;
            };
            if let Some(delim) = delimiter.as_deref() {
                if let Some((segment, _)) = rest.split_once(delim) {
                    common_prefixes.insert(format!("{prefix}{segment}{delim}"));
                    continue;
                }
            }
            contents.push(Object {
                key: object.key,
                last_modified: object.last_modified,
                size: object.size,
                e_tag: object.etag,
            });
        }
        contents.sort_by(|a, b| a.key.cmp(&b.key));

        debug!(
            bucket = %input.bucket,
            prefix = %prefix,
            keys = contents.len(),
            prefixes = common_prefixes.len(),
            "listed objects"
        );

        Ok(ListObjectsV2Output {
            name: input.bucket,
            prefix,
            delimiter,
            key_count: contents.len(),
            is_truncated: false,
            contents,
            common_prefixes: common_prefixes
                .into_iter()
                .map(|prefix| CommonPrefix { prefix })
                .collect(),
        })
    }

    /// Read an object.
    pub async fn handle_get_object(
        &self,
        input: GetObjectInput,
    ) -> Result<GetObjectOutput, S3ServiceError> {
        let object = self.object(&input.bucket, &input.key).await?;
        Ok(GetObjectOutput {
            content_length: object.info.size,
            last_modified: object.info.last_modified,
            e_tag: object.info.etag,
            body: object.data,
        })
    }

    /// Read an object's metadata.
    pub async fn handle_head_object(
        &self,
        input: HeadObjectInput,
    ) -> Result<HeadObjectOutput, S3ServiceError> {
        let object = self.object(&input.bucket, &input.key).await?;
        Ok(HeadObjectOutput {
            content_length: object.info.size,
            last_modified: object.info.last_modified,
            e_tag: object.info.etag,
        })
    }

    /// Report an object's ACL: the bucket owner holds `FULL_CONTROL`.
    pub async fn handle_get_object_acl(
        &self,
        input: GetObjectAclInput,
    ) -> Result<GetObjectAclOutput, S3ServiceError> {
        validate_object_key(&input.key)?;
        let (store, info) = self.bucket(&input.bucket).await?;
        if store.get_object(&input.key).await?.is_none() {
            return Err(S3ServiceError::NoSuchKey {
                bucket: input.bucket,
                key: input.key,
            });
        }

        let owner = self.owner(&info.owner);
        let grantee = Grantee {
            id: Some(owner.id.clone()),
            display_name: owner.display_name.clone(),
            uri: None,
            r#type: GranteeType::CanonicalUser,
        };
        Ok(GetObjectAclOutput {
            owner: Some(owner),
            grants: vec![Grant {
                grantee,
                permission: Permission::FullControl,
            }],
        })
    }

    /// Create or replace an object.
    pub async fn handle_put_object(
        &self,
        input: PutObjectInput,
    ) -> Result<PutObjectOutput, S3ServiceError> {
        validate_object_key(&input.key)?;
        let (store, _) = self.bucket(&input.bucket).await?;
        let info = store.put_object(&input.key, input.body).await?;
        info!(bucket = %input.bucket, key = %info.key, size = info.size, "object stored");
        Ok(PutObjectOutput { e_tag: info.etag })
    }
}
