use std::{
    future::Future,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::{self, File},
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, error, info, instrument, warn};

use super::entities::{parse_writing_id, writing_file_name, Writing, WritingSummary};

/// How many taken numbers [WritingStorageImpl::save] steps over before giving up. Only matters
/// when several instances write into the same directory.
const MAX_SAVE_ATTEMPTS: u32 = 16;

/// Interface for abstracting storage of writings.
pub trait WritingStorage: Send + Sync + 'static {
    /// Name the next saved writing will get. Never fails: an unreadable directory yields
    /// `1.txt`.
    fn next_filename(&self) -> impl Future<Output = String> + Send;

    /// Persists `text` as a new writing.
    fn save(&self, text: &str) -> impl Future<Output = Result<Writing>> + Send;

    /// All writings ordered by their number.
    fn list(&self) -> impl Future<Output = Result<Vec<WritingSummary>>> + Send;

    /// Reads back the content of a single writing.
    fn read(&self, path: &Path) -> impl Future<Output = Result<String>> + Send;
}

/// The main realization of [WritingStorage]: one directory of numbered text files.
pub struct WritingStorageImpl {
    writings_dir: PathBuf,
}

impl WritingStorageImpl {
    pub fn new(writings_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&writings_dir)?;

        Ok(Self { writings_dir })
    }

    pub fn dir(&self) -> &Path {
        &self.writings_dir
    }

    /// Highest writing number present in the directory.
    async fn max_id(&self) -> Result<Option<u64>, std::io::Error> {
        let mut entries = fs::read_dir(&self.writings_dir).await?;
        let mut max = None;
        while let Some(entry) = entries.next_entry().await? {
            if let Some(id) = parse_writing_id(Path::new(&entry.file_name())) {
                max = max.max(Some(id));
            }
        }
        Ok(max)
    }

    async fn next_id(&self) -> u64 {
        match self.max_id().await {
            Ok(Some(max)) => max.saturating_add(1),
            Ok(None) => 1,
            Err(e) => {
                error!("Failed to read directory {:?}: {e}", self.writings_dir);
                1
            }
        }
    }

    async fn summarize(&self, id: u64, path: PathBuf) -> Result<WritingSummary> {
        let content = self.read(&path).await?;
        let modified = fs::metadata(&path)
            .await
            .and_then(|v| v.modified())
            .map(DateTime::<Local>::from)
            .ok();
        Ok(WritingSummary::new(id, path, &content, modified))
    }

    async fn write_new(path: &Path, text: &str) -> Result<(), std::io::Error> {
        let mut file = File::options()
            .write(true)
            .create_new(true)
            .open(path)
            .await?;
        let result = Self::write_locked(&mut file, text).await;
        drop(file);
        Self::discard_partial(path, result).await
    }

    async fn write_locked(file: &mut File, text: &str) -> Result<(), std::io::Error> {
        file.lock_exclusive()?;
        let result = async {
            file.write_all(text.as_bytes()).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;
        file.unlock_async().await?;
        result
    }

    /// A file that failed to be written is removed, so it neither holds its number nor shows
    /// up in the list.
    async fn discard_partial(
        path: &Path,
        result: Result<(), std::io::Error>,
    ) -> Result<(), std::io::Error> {
        if let Err(e) = &result {
            warn!("Removing partially written {path:?} after {e}");
            if let Err(e) = fs::remove_file(path).await {
                error!("Failed to remove {path:?}: {e}");
            }
        }
        result
    }
}

impl WritingStorage for WritingStorageImpl {
    async fn next_filename(&self) -> String {
        writing_file_name(self.next_id().await)
    }

    #[instrument(skip_all, fields(dir = ?self.writings_dir))]
    async fn save(&self, text: &str) -> Result<Writing> {
        let mut id = self.next_id().await;
        for _ in 0..MAX_SAVE_ATTEMPTS {
            let path = self.writings_dir.join(writing_file_name(id));
            match Self::write_new(&path, text).await {
                Ok(()) => {
                    info!("Saved writing {id} into {path:?}");
                    return Ok(Writing {
                        id: Some(id),
                        path: Some(path),
                        content: text.to_string(),
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    warn!("Writing {id} appeared while saving, trying the next number");
                    id = id.saturating_add(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(anyhow!(
            "Gave up saving after {MAX_SAVE_ATTEMPTS} taken numbers in {:?}",
            self.writings_dir
        ))
    }

    async fn list(&self) -> Result<Vec<WritingSummary>> {
        let mut entries = fs::read_dir(&self.writings_dir).await?;
        let mut writings = vec![];
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(id) = parse_writing_id(&path) else {
                debug!("Skipping {path:?}, it isn't a numbered writing");
                continue;
            };
            match self.summarize(id, path.clone()).await {
                Ok(summary) => writings.push(summary),
                // Unreadable entries are left out of the list.
                Err(e) => warn!("Failed to read writing {path:?}: {e}"),
            }
        }
        writings.sort_by_key(|v| v.id);
        Ok(writings)
    }

    async fn read(&self, path: &Path) -> Result<String> {
        let mut file = File::open(path).await?;
        file.lock_shared()?;
        let mut content = String::new();
        let result = file.read_to_string(&mut content).await;
        file.unlock_async().await?;
        result?;
        Ok(content)
    }
}
