//! Directory scanning and episode assembly.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::MatcherError;
use super::probe::FrameRateProbe;
use super::types::Episode;
use crate::config::MuxingConfiguration;
use crate::media::{extension_matches, FrameRate, CHAPTER_EXTENSION, SUBTITLE_EXTENSION};

/// Chapter language when the text shows no Japanese script.
const DEFAULT_CHAPTER_LANGUAGE: &str = "eng";
const JAPANESE_CHAPTER_LANGUAGE: &str = "jpn";

/// One directory entry.
#[derive(Debug, Clone)]
struct Entry {
    name: String,
    path: PathBuf,
    is_dir: bool,
    is_file: bool,
}

/// Sorted directory listings, each read at most once per scan.
#[derive(Default)]
struct ListingCache {
    listings: HashMap<PathBuf, Vec<Entry>>,
}

impl ListingCache {
    async fn get(&mut self, dir: &Path) -> Result<&[Entry], MatcherError> {
        if !self.listings.contains_key(dir) {
            let listing = read_listing(dir).await?;
            self.listings.insert(dir.to_path_buf(), listing);
        }
        Ok(self.listings.get(dir).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// Listing of a directory that may not exist; missing reads as empty.
    async fn get_optional(&mut self, dir: &Path) -> &[Entry] {
        if !self.listings.contains_key(dir) {
            let listing = read_listing(dir).await.unwrap_or_default();
            self.listings.insert(dir.to_path_buf(), listing);
        }
        self.listings.get(dir).map(Vec::as_slice).unwrap_or(&[])
    }
}

async fn read_listing(dir: &Path) -> Result<Vec<Entry>, MatcherError> {
    let read_err = |source| MatcherError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut reader = fs::read_dir(dir).await.map_err(read_err)?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await.map_err(read_err)? {
        let path = entry.path();
        let file_type = entry.file_type().await.map_err(read_err)?;
        // Symlinked files count as files; symlinked directories are not walked.
        let is_file = file_type.is_file()
            || (file_type.is_symlink()
                && fs::metadata(&path).await.map(|m| m.is_file()).unwrap_or(false));
        entries.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
            is_dir: file_type.is_dir(),
            is_file,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Finds video files and groups their siblings into episodes.
pub struct FileMatcher<P: FrameRateProbe> {
    config: MuxingConfiguration,
    probe: Arc<P>,
    completed_dir: Option<PathBuf>,
}

impl<P: FrameRateProbe> FileMatcher<P> {
    /// Creates a matcher for one configuration.
    pub fn new(config: MuxingConfiguration, probe: Arc<P>) -> Self {
        Self {
            config,
            probe,
            completed_dir: None,
        }
    }

    /// Also treats outputs already relocated under `dir` as completed.
    pub fn with_completed_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.completed_dir = dir;
        self
    }

    /// Scans the root directory and returns one episode per video that
    /// still needs muxing, in scan order.
    pub async fn discover(&self) -> Result<Vec<Episode>, MatcherError> {
        let root = &self.config.root_dir;
        let is_dir = fs::metadata(root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(MatcherError::RootNotFound { path: root.clone() });
        }

        let mut cache = ListingCache::default();
        let mut episodes = Vec::new();
        let mut pending = vec![root.clone()];
        let video_ext = self.config.video_source.extension();

        while let Some(dir) = pending.pop() {
            let entries = match cache.get(&dir).await {
                Ok(entries) => entries.to_vec(),
                Err(e) if dir == *root => return Err(e),
                Err(e) => {
                    warn!("Skipping unreadable directory: {}", e);
                    continue;
                }
            };

            let mut subdirs = Vec::new();
            for entry in &entries {
                if entry.is_dir {
                    if self.completed_dir.as_deref() != Some(entry.path.as_path()) {
                        subdirs.push(entry.path.clone());
                    }
                } else if entry.is_file && extension_matches(&entry.path, video_ext) {
                    if let Some(episode) = self.match_video(&dir, entry, &mut cache).await {
                        episodes.push(episode);
                    }
                }
            }
            // Reversed so the stack pops them in name order.
            pending.extend(subdirs.into_iter().rev());
        }

        info!(
            root = %root.display(),
            count = episodes.len(),
            "Discovered episodes"
        );
        Ok(episodes)
    }

    /// Builds the episode for one video, or None if it must be skipped.
    async fn match_video(
        &self,
        dir: &Path,
        video: &Entry,
        cache: &mut ListingCache,
    ) -> Option<Episode> {
        let stem = video.path.file_stem()?.to_string_lossy().into_owned();
        let output_ext = self.config.output.extension();
        let output_file = dir.join(format!("{}.{}", stem, output_ext));

        if self.already_completed(dir, &stem, output_ext, cache).await {
            debug!(video = %video.path.display(), "Skipping, output already exists");
            return None;
        }

        let listing = cache.get(dir).await.ok()?;

        let mut audio_files = Vec::new();
        for source in &self.config.audio_sources {
            for path in siblings(listing, &stem, source.extension()) {
                if !audio_files.contains(&path) {
                    audio_files.push(path);
                }
            }
        }
        if !self.config.audio_sources.is_empty() && audio_files.is_empty() {
            debug!(video = %video.path.display(), "Skipping, no matching audio");
            return None;
        }

        let subtitle_files = if self.config.mux_subtitles {
            siblings(listing, &stem, SUBTITLE_EXTENSION)
        } else {
            Vec::new()
        };

        let chapter_file = listing
            .iter()
            .find(|e| self.config.mux_chapters && is_named(e, &stem, CHAPTER_EXTENSION))
            .map(|e| e.path.clone());

        let chapter_language = match &chapter_file {
            Some(path) => match fs::read(path).await {
                Ok(bytes) => chapter_language(&String::from_utf8_lossy(&bytes)),
                Err(e) => {
                    warn!(chapter = %path.display(), "Skipping episode, unreadable chapters: {}", e);
                    return None;
                }
            },
            None => DEFAULT_CHAPTER_LANGUAGE,
        };

        let frame_rate = match &self.config.frame_rate {
            FrameRate::Fixed(rate) => rate.clone(),
            FrameRate::Auto => match self.probe.probe(&video.path).await {
                Ok(rate) => rate,
                Err(e) => {
                    warn!("Skipping episode: {}", e);
                    return None;
                }
            },
        };

        let mut total_bytes = 0u64;
        for path in std::iter::once(&video.path).chain(audio_files.iter()) {
            match fs::metadata(path).await {
                Ok(meta) => total_bytes += meta.len(),
                Err(e) => {
                    warn!(file = %path.display(), "Skipping episode, cannot stat: {}", e);
                    return None;
                }
            }
        }

        Some(Episode {
            task_id: Uuid::new_v4(),
            video_file: video.path.clone(),
            frame_rate,
            audio_files,
            audio_language: self.config.audio_language.clone(),
            subtitle_files,
            subtitle_language: self.config.subtitle_language.clone(),
            chapter_file,
            chapter_language: chapter_language.to_string(),
            output_file,
            output_format: self.config.output,
            total_bytes,
        })
    }

    /// Whether an output for `stem` exists, plain or checksum-tagged, next to
    /// the video or in its mirrored completed directory.
    async fn already_completed(
        &self,
        dir: &Path,
        stem: &str,
        ext: &str,
        cache: &mut ListingCache,
    ) -> bool {
        let mut dirs = vec![dir.to_path_buf()];
        if let Some(completed) = &self.completed_dir {
            if let Ok(relative) = dir.strip_prefix(&self.config.root_dir) {
                dirs.push(completed.join(relative));
            }
        }

        for dir in dirs {
            let listing = cache.get_optional(&dir).await;
            let completed = listing.iter().any(|e| {
                is_named(e, stem, ext) || (e.is_file && is_tagged_output(&e.name, stem, ext))
            });
            if completed {
                return true;
            }
        }
        false
    }
}

/// Whether `entry` is the file `<stem>.<ext>`, extension in any case.
fn is_named(entry: &Entry, stem: &str, ext: &str) -> bool {
    entry.is_file
        && entry.path.file_stem() == Some(OsStr::new(stem))
        && extension_matches(&entry.path, ext)
}

/// Files in `listing` whose name starts with `stem` and has extension `ext`.
fn siblings(listing: &[Entry], stem: &str, ext: &str) -> Vec<PathBuf> {
    listing
        .iter()
        .filter(|e| e.is_file && e.name.starts_with(stem) && extension_matches(&e.path, ext))
        .map(|e| e.path.clone())
        .collect()
}

/// Whether `name` is `<stem> [XXXXXXXX].<ext>` with 8 hex digits.
pub fn is_tagged_output(name: &str, stem: &str, ext: &str) -> bool {
    let Some(rest) = name.strip_prefix(stem).and_then(|r| r.strip_prefix(" [")) else {
        return false;
    };
    let Some((tag, rest)) = rest.split_once(']') else {
        return false;
    };
    let Some(tail) = rest.strip_prefix('.') else {
        return false;
    };
    tag.len() == 8 && tag.chars().all(|c| c.is_ascii_hexdigit()) && tail.eq_ignore_ascii_case(ext)
}

/// Language tag for chapter names: Japanese if any kana appears.
pub fn chapter_language(text: &str) -> &'static str {
    let is_kana = |c: char| {
        matches!(c,
            '\u{3040}'..='\u{30FF}' // Hiragana, Katakana
            | '\u{31F0}'..='\u{31FF}' // Katakana Phonetic Extensions
            | '\u{FF66}'..='\u{FF9F}') // Halfwidth Katakana
    };
    if text.chars().any(is_kana) {
        JAPANESE_CHAPTER_LANGUAGE
    } else {
        DEFAULT_CHAPTER_LANGUAGE
    }
}
