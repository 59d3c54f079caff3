//! Downloads for the `get` command.

use std::path::Path;

use anyhow::{Context, Result};
use ruststack_client_core::{
    Configure, GetObjectArgs, ObjectBackend, ObjectStat, OperationResult, ops,
};
use tempfile::NamedTempFile;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// What to download.
#[derive(Debug, Clone, Default)]
pub struct Fetch {
    pub bucket: String,
    pub object: String,
    pub offset: Option<u64>,
    pub length: Option<u64>,
    pub version_id: Option<String>,
}

impl Fetch {
    fn configure(&self) -> Option<Configure<GetObjectArgs>> {
        self.version_id.clone().map(|version| {
            Box::new(move |args: GetObjectArgs| args.with_version_id(version))
                as Configure<GetObjectArgs>
        })
    }

    async fn copy<B, W>(
        &self,
        client: &B,
        dest: &mut W,
        cancel: &CancellationToken,
    ) -> OperationResult<ObjectStat>
    where
        B: ObjectBackend + ?Sized,
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        match self.offset {
            Some(offset) => {
                ops::download_range(
                    client,
                    &self.bucket,
                    &self.object,
                    offset,
                    self.length.unwrap_or(0),
                    dest,
                    self.configure(),
                    Some(cancel),
                )
                .await
            }
            None => {
                ops::download(
                    client,
                    &self.bucket,
                    &self.object,
                    dest,
                    self.configure(),
                    Some(cancel),
                )
                .await
            }
        }
    }

    /// Stream the object into `dest` and close it.
    pub async fn to_writer<B, W>(
        &self,
        client: &B,
        mut dest: W,
        cancel: &CancellationToken,
    ) -> Result<OperationResult<ObjectStat>>
    where
        B: ObjectBackend + ?Sized,
        W: AsyncWrite + Unpin + Send,
    {
        let result = self.copy(client, &mut dest, cancel).await;
        dest.shutdown().await.context("failed to close output")?;
        Ok(result)
    }

    /// Download into a temporary file beside `path`, then move it into place.
    ///
    /// `path` is left untouched when the download fails.
    pub async fn to_path<B>(
        &self,
        client: &B,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<OperationResult<ObjectStat>>
    where
        B: ObjectBackend + ?Sized,
    {
        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let staging = NamedTempFile::new_in(dir)
            .with_context(|| format!("cannot create temporary file in {}", dir.display()))?;
        let file = staging
            .reopen()
            .with_context(|| format!("cannot open {}", staging.path().display()))?;

        let result = self
            .to_writer(client, tokio::fs::File::from_std(file), cancel)
            .await?;
        if result.is_success() {
            staging
                .persist(path)
                .with_context(|| format!("cannot write {}", path.display()))?;
        } else {
            debug!(path = %path.display(), "download failed, discarding staged file");
        }
        Ok(result)
    }
}
