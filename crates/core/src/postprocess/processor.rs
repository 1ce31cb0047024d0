//! Checksum tagging and relocation of finished outputs.

use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::PostProcessError;
use crate::config::PostProcessConfig;
use crate::events::{EventSender, MuxEvent, TaskStatus};
use crate::matcher::Episode;
use crate::progress::byte_percent;

/// Directory under the root that receives finished files.
pub const COMPLETED_DIR_NAME: &str = "completed";

/// Runs the per-job steps after a muxer produced its output.
#[derive(Debug, Clone)]
pub struct PostProcessor {
    config: PostProcessConfig,
    root_dir: PathBuf,
}

impl PostProcessor {
    /// Creates a post processor for outputs under `root_dir`.
    pub fn new(config: PostProcessConfig, root_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            root_dir: root_dir.into(),
        }
    }

    pub fn config(&self) -> &PostProcessConfig {
        &self.config
    }

    /// `<root>/completed`
    pub fn completed_dir(&self) -> PathBuf {
        self.root_dir.join(COMPLETED_DIR_NAME)
    }

    /// Checksum-tags and relocates the episode's output, as configured.
    ///
    /// Returns the final path of the file, or None if the output does not
    /// exist (nothing to do).
    pub async fn finalize(
        &self,
        episode: &Episode,
        events: &EventSender,
    ) -> Result<Option<PathBuf>, PostProcessError> {
        let mut path = episode.output_file.clone();
        if !fs::try_exists(&path).await? {
            debug!(output = %path.display(), "No output to finalize");
            return Ok(None);
        }

        if self.config.embed_crc32 {
            let crc = self.checksum(&path, episode.task_id, events).await?;
            let tagged = tagged_path(&path, crc);
            if fs::try_exists(&tagged).await? {
                return Err(PostProcessError::DestinationExists { path: tagged });
            }
            fs::rename(&path, &tagged)
                .await
                .map_err(|e| PostProcessError::move_failed(path.clone(), tagged.clone(), e))?;
            info!(task_id = %episode.task_id, crc = %format!("{:08X}", crc), "Tagged output");
            path = tagged;
        }

        if self.config.move_to_completed {
            events
                .emit(MuxEvent::TaskProgress {
                    task_id: episode.task_id,
                    percent: 100,
                    status: TaskStatus::Moving,
                })
                .await;
            path = relocate(&self.root_dir, &path).await?;
            info!(task_id = %episode.task_id, to = %path.display(), "Moved output");
        }

        Ok(Some(path))
    }

    /// CRC-32 of the file, reporting progress after every chunk.
    async fn checksum(
        &self,
        path: &Path,
        task_id: Uuid,
        events: &EventSender,
    ) -> Result<u32, PostProcessError> {
        let checksum_err = |source| PostProcessError::ChecksumFailed {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).await.map_err(checksum_err)?;
        let total = file.metadata().await.map_err(checksum_err)?.len();
        let mut buffer = vec![0u8; self.config.read_buffer_bytes.max(1)];
        let mut hasher = crc32fast::Hasher::new();
        let mut done = 0u64;

        loop {
            let filled = read_chunk(&mut file, &mut buffer)
                .await
                .map_err(checksum_err)?;
            if filled == 0 {
                break;
            }
            hasher.update(&buffer[..filled]);
            done += filled as u64;

            events
                .emit(MuxEvent::TaskProgress {
                    task_id,
                    percent: byte_percent(done, total),
                    status: TaskStatus::Checksumming,
                })
                .await;
        }

        Ok(hasher.finalize())
    }
}

/// Fills `buffer` unless the end of the file comes first.
async fn read_chunk(file: &mut File, buffer: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        let n = file.read(&mut buffer[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// `dir/name.ext` becomes `dir/name [XXXXXXXX].ext`.
pub fn tagged_path(path: &Path, crc: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{} [{:08X}].{}", stem, crc, ext.to_string_lossy()),
        None => format!("{} [{:08X}]", stem, crc),
    };
    path.with_file_name(name)
}

/// Moves `path` to the same relative location under `<root>/completed/`.
pub async fn relocate(root: &Path, path: &Path) -> Result<PathBuf, PostProcessError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| PostProcessError::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })?;
    let destination = root.join(COMPLETED_DIR_NAME).join(relative);

    if fs::try_exists(&destination).await? {
        return Err(PostProcessError::DestinationExists { path: destination });
    }

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| PostProcessError::DirectoryCreationFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }

    let moved = try_atomic_move(path, &destination)
        .await
        .map_err(|e| PostProcessError::move_failed(path.to_path_buf(), destination.clone(), e))?;

    if !moved {
        debug!(from = %path.display(), "Cross-device move, copying");
        fs::copy(path, &destination)
            .await
            .map_err(|e| PostProcessError::move_failed(path.to_path_buf(), destination.clone(), e))?;
        fs::remove_file(path)
            .await
            .map_err(|e| PostProcessError::move_failed(path.to_path_buf(), destination.clone(), e))?;
    }

    Ok(destination)
}

/// Attempts a rename; Ok(false) means source and destination are on
/// different filesystems.
async fn try_atomic_move(source: &Path, destination: &Path) -> Result<bool, std::io::Error> {
    match fs::rename(source, destination).await {
        Ok(()) => Ok(true),
        Err(e) => {
            // EXDEV is 18 on Linux
            if e.kind() == std::io::ErrorKind::CrossesDevices || e.raw_os_error() == Some(18) {
                Ok(false)
            } else {
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::episode;
    use tempfile::TempDir;

    async fn drain(mut rx: tokio::sync::mpsc::Receiver<MuxEvent>) -> Vec<MuxEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_tagged_path() {
        assert_eq!(
            tagged_path(Path::new("/m/ep01.mkv"), 0xDEADBEEF),
            PathBuf::from("/m/ep01 [DEADBEEF].mkv")
        );
        assert_eq!(
            tagged_path(Path::new("/m/ep01.mp4"), 0x1F),
            PathBuf::from("/m/ep01 [0000001F].mp4")
        );
    }

    #[tokio::test]
    async fn test_finalize_missing_output() {
        let dir = TempDir::new().unwrap();
        let ep = episode(dir.path().join("e.264"), dir.path().join("e.mkv"));
        let processor = PostProcessor::new(
            PostProcessConfig::default().with_crc32(true),
            dir.path(),
        );

        let result = processor.finalize(&ep, &EventSender::disabled()).await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_finalize_plain() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("e.mkv");
        fs::write(&output, b"data").await.unwrap();
        let ep = episode(dir.path().join("e.264"), &output);

        let processor = PostProcessor::new(PostProcessConfig::default(), dir.path());
        let result = processor
            .finalize(&ep, &EventSender::disabled())
            .await
            .unwrap();
        assert_eq!(result, Some(output));
    }

    #[tokio::test]
    async fn test_finalize_checksum_rename() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("ep01.mkv");
        // CRC-32 of "123456789" is CBF43926
        fs::write(&output, b"123456789").await.unwrap();
        let ep = episode(dir.path().join("ep01.264"), &output);

        let processor = PostProcessor::new(
            PostProcessConfig::default()
                .with_crc32(true)
                .with_read_buffer(4),
            dir.path(),
        );
        let (events, rx) = EventSender::channel(16);
        let result = processor.finalize(&ep, &events).await.unwrap();

        let expected = dir.path().join("ep01 [CBF43926].mkv");
        assert_eq!(result, Some(expected.clone()));
        assert!(expected.exists());
        assert!(!output.exists());

        let percents: Vec<u32> = drain(rx)
            .await
            .into_iter()
            .map(|e| match e {
                MuxEvent::TaskProgress {
                    percent,
                    status: TaskStatus::Checksumming,
                    ..
                } => percent,
                other => panic!("unexpected event {:?}", other),
            })
            .collect();
        // 9 bytes in 4-byte chunks
        assert_eq!(percents, vec![44, 89, 100]);
    }

    #[tokio::test]
    async fn test_finalize_checksum_and_move() {
        let dir = TempDir::new().unwrap();
        let season = dir.path().join("season 1");
        fs::create_dir_all(&season).await.unwrap();
        let output = season.join("ep01.mkv");
        fs::write(&output, b"123456789").await.unwrap();
        let ep = episode(season.join("ep01.264"), &output);

        let processor = PostProcessor::new(
            PostProcessConfig::default()
                .with_crc32(true)
                .with_move_to_completed(true),
            dir.path(),
        );
        let (events, rx) = EventSender::channel(16);
        let result = processor.finalize(&ep, &events).await.unwrap();

        let expected = dir.path().join("completed/season 1/ep01 [CBF43926].mkv");
        assert_eq!(result, Some(expected.clone()));
        assert!(expected.exists());
        assert!(!season.join("ep01 [CBF43926].mkv").exists());

        let statuses: Vec<TaskStatus> = drain(rx)
            .await
            .into_iter()
            .filter_map(|e| match e {
                MuxEvent::TaskProgress { status, .. } => Some(status),
                _ => None,
            })
            .collect();
        assert_eq!(statuses.last(), Some(&TaskStatus::Moving));
    }

    #[tokio::test]
    async fn test_relocate_outside_root() {
        let root = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let file = other.path().join("e.mkv");
        fs::write(&file, b"x").await.unwrap();

        let err = relocate(root.path(), &file).await.unwrap_err();
        assert!(matches!(err, PostProcessError::OutsideRoot { .. }));
        assert!(file.exists());
    }

    #[tokio::test]
    async fn test_relocate_destination_exists() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("e.mkv");
        fs::write(&file, b"new").await.unwrap();
        fs::create_dir_all(dir.path().join("completed")).await.unwrap();
        fs::write(dir.path().join("completed/e.mkv"), b"old")
            .await
            .unwrap();

        let err = relocate(dir.path(), &file).await.unwrap_err();
        assert!(matches!(err, PostProcessError::DestinationExists { .. }));
        assert_eq!(fs::read(&file).await.unwrap(), b"new");
    }
}
