//! An S3-compatible remote. Objects and the index live under one flat key
//! namespace, sharded the same way the local object store is, so a bucket
//! browsed by hand looks just like a workspace's `objects/` directory.

use crate::backend::RemoteBackend;
use crate::error::SyncError;
use crate::retry::with_retry;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use nt_hash::Oid;
use nt_index::Index;
use nt_objects::ObjectRef;

const INDEX_KEY: &str = "index";

/// Configuration for an S3-compatible remote. `endpoint` lets this point at
/// a MinIO/S3-compatible service rather than AWS proper.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub prefix: String,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct S3Backend {
    client: Client,
    config: S3Config,
}

impl S3Backend {
    pub async fn new(config: S3Config) -> Result<Self, SyncError> {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        let client = if let Some(endpoint) = &config.endpoint {
            let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
                .endpoint_url(endpoint.clone())
                .build();
            Client::from_conf(s3_config)
        } else {
            Client::new(&sdk_config)
        };
        Ok(S3Backend { client, config })
    }

    fn object_key(&self, oid: &Oid, suffix: &str) -> String {
        format!("{}/objects/{}", self.config.prefix, oid.to_relative_path(suffix))
    }

    fn index_key(&self) -> String {
        format!("{}/{}", self.config.prefix, INDEX_KEY)
    }

    async fn get_key(&self, key: &str) -> Result<Vec<u8>, SyncError> {
        with_retry("s3 get", || async {
            let response = self
                .client
                .get_object()
                .bucket(&self.config.bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| SyncError::Backend(e.to_string()))?;
            let body = response
                .body
                .collect()
                .await
                .map_err(|e| SyncError::Backend(e.to_string()))?;
            Ok(body.into_bytes().to_vec())
        })
        .await
    }

    async fn put_key(&self, key: &str, bytes: Vec<u8>) -> Result<(), SyncError> {
        with_retry("s3 put", || {
            let bytes = bytes.clone();
            async move {
                self.client
                    .put_object()
                    .bucket(&self.config.bucket)
                    .key(key)
                    .body(bytes.into())
                    .send()
                    .await
                    .map_err(|e| SyncError::Backend(e.to_string()))?;
                Ok(())
            }
        })
        .await
    }
}

#[async_trait]
impl RemoteBackend for S3Backend {
    async fn get_object(&self, oid: &Oid, suffix: &str) -> Result<Vec<u8>, SyncError> {
        let key = self.object_key(oid, suffix);
        self.get_key(&key).await.map_err(|err| match err {
            SyncError::Backend(message) if is_not_found(&message) => {
                SyncError::NotFound { oid: oid.as_str().to_string() }
            }
            other => other,
        })
    }

    async fn put_object(&self, oid: &Oid, suffix: &str, bytes: &[u8]) -> Result<(), SyncError> {
        if self.object_exists(oid, suffix).await? {
            return Ok(());
        }
        let key = self.object_key(oid, suffix);
        self.put_key(&key, bytes.to_vec()).await
    }

    async fn object_exists(&self, oid: &Oid, suffix: &str) -> Result<bool, SyncError> {
        let key = self.object_key(oid, suffix);
        with_retry("s3 head", || async {
            match self
                .client
                .head_object()
                .bucket(&self.config.bucket)
                .key(&key)
                .send()
                .await
            {
                Ok(_) => Ok(true),
                Err(e) if is_not_found(&e.to_string()) => Ok(false),
                Err(e) => Err(SyncError::Backend(e.to_string())),
            }
        })
        .await
    }

    async fn delete_object(&self, oid: &Oid, suffix: &str) -> Result<(), SyncError> {
        let key = self.object_key(oid, suffix);
        with_retry("s3 delete", || async {
            self.client
                .delete_object()
                .bucket(&self.config.bucket)
                .key(&key)
                .send()
                .await
                .map_err(|e| SyncError::Backend(e.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn list_objects(&self) -> Result<Vec<ObjectRef>, SyncError> {
        let prefix = format!("{}/objects/", self.config.prefix);
        let mut out = Vec::new();
        let mut continuation_token: Option<String> = None;
        loop {
            let mut request = self.client.list_objects_v2().bucket(&self.config.bucket).prefix(&prefix);
            if let Some(token) = &continuation_token {
                request = request.continuation_token(token);
            }
            let response = with_retry("s3 list", || async {
                request
                    .clone()
                    .send()
                    .await
                    .map_err(|e| SyncError::Backend(e.to_string()))
            })
            .await?;

            for object in response.contents() {
                let Some(key) = object.key() else { continue };
                let Some(name) = key.rsplit('/').next() else { continue };
                if let Some(hex) = name.strip_suffix(".pack") {
                    if let Ok(oid) = Oid::from_hex(hex) {
                        out.push(ObjectRef { oid, is_pack: true });
                    }
                } else if let Ok(oid) = Oid::from_hex(name) {
                    out.push(ObjectRef { oid, is_pack: false });
                }
            }

            continuation_token = response.next_continuation_token().map(str::to_string);
            if continuation_token.is_none() {
                break;
            }
        }
        Ok(out)
    }

    async fn get_index(&self) -> Result<Option<Index>, SyncError> {
        match self.get_key(&self.index_key()).await {
            Ok(bytes) => Ok(Some(serde_yaml::from_slice(&bytes)?)),
            Err(SyncError::Backend(message)) if is_not_found(&message) => Ok(None),
            Err(other) => Err(other),
        }
    }

    async fn put_index(&self, index: &Index) -> Result<(), SyncError> {
        let bytes = serde_yaml::to_string(index)?.into_bytes();
        self.put_key(&self.index_key(), bytes).await
    }
}

fn is_not_found(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("404")
        || lower.contains("not found")
        || lower.contains("nosuchkey")
        || lower.contains("no such key")
}
