//! Filesystem-backed object store
//!
//! A bucket is a directory. Object keys are relative paths inside it, and an
//! optional `<object>.meta.json` sidecar holds the object's [`HttpMetadata`].

use crate::{GetOptions, HttpMetadata, ObjectBody, ObjectStore, Result, StoreError, StoredObject};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, instrument};

/// Suffix of metadata sidecar files
pub const METADATA_SUFFIX: &str = ".meta.json";

/// Read size used when streaming file content
const CHUNK_SIZE: usize = 64 * 1024;

/// Object store reading from a local bucket directory
#[derive(Clone, Debug)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Open a bucket directory, which must already exist
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let metadata = tokio::fs::metadata(&root).await.map_err(|e| {
            StoreError::Configuration(format!("bucket directory {}: {}", root.display(), e))
        })?;
        if !metadata.is_dir() {
            return Err(StoreError::Configuration(format!(
                "bucket path {} is not a directory",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    /// Bucket directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key onto a path inside the bucket.
    ///
    /// Every `/`-separated segment becomes exactly one path component, so two
    /// distinct keys never name the same file.
    pub fn object_path(&self, key: &str) -> Result<PathBuf> {
        let invalid = || StoreError::InvalidKey(key.to_string());
        if key.is_empty() || key.contains('\\') || key.contains('\0') {
            return Err(invalid());
        }

        let mut path = self.root.clone();
        for segment in key.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(invalid());
            }
            path.push(segment);
        }

        let is_sidecar = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(METADATA_SUFFIX));
        if is_sidecar {
            return Err(invalid());
        }
        Ok(path)
    }

    async fn read_metadata(&self, key: &str, path: &Path) -> Result<HttpMetadata> {
        let guessed = mime_guess::from_path(key)
            .first()
            .map(|mime| HttpMetadata::with_content_type(mime.essence_str()))
            .unwrap_or_default();

        let mut sidecar = path.as_os_str().to_owned();
        sidecar.push(METADATA_SUFFIX);

        match tokio::fs::read(&sidecar).await {
            Ok(raw) => {
                let explicit: HttpMetadata = serde_json::from_slice(&raw)?;
                Ok(explicit.or(guessed))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(guessed),
            Err(e) => Err(e.into()),
        }
    }
}

/// Stream exactly `remaining` bytes from the file's current position
fn file_body(file: File, remaining: u64) -> ObjectBody {
    let stream = stream::try_unfold((file, remaining), |(mut file, remaining)| async move {
        if remaining == 0 {
            return Ok::<_, std::io::Error>(None);
        }

        let want = remaining.min(CHUNK_SIZE as u64) as usize;
        let mut buf = vec![0u8; want];
        let read = file.read(&mut buf).await?;
        if read == 0 {
            return Err(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                "object truncated while streaming",
            ));
        }
        buf.truncate(read);

        Ok(Some((Bytes::from(buf), (file, remaining - read as u64))))
    });

    ObjectBody::from_stream(stream.boxed())
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str, options: GetOptions) -> Result<Option<StoredObject>> {
        let path = self.object_path(key)?;

        let mut file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let file_meta = file.metadata().await?;
        if !file_meta.is_file() {
            debug!(path = %path.display(), "Key resolves to a non-file entry");
            return Ok(None);
        }

        let size = file_meta.len();
        let http_metadata = self.read_metadata(key, &path).await?;

        let (range, remaining) = match options.range {
            Some(requested) => {
                let served = requested.resolve(size)?;
                file.seek(SeekFrom::Start(served.offset)).await?;
                (Some(served), served.length)
            }
            None => (None, size),
        };

        Ok(Some(StoredObject {
            key: key.to_string(),
            size,
            http_metadata,
            range,
            body: file_body(file, remaining),
        }))
    }
}
