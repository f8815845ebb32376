//! Where narration audio and exported documents end up.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

/// Receives finished artifacts.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Hand a WAV clip to playback. Returns where it went.
    async fn play_audio(&self, wav: Vec<u8>) -> anyhow::Result<String>;

    /// Persist a document under `file_name`. Returns its path.
    async fn save_document(&self, file_name: &str, bytes: Vec<u8>) -> anyhow::Result<PathBuf>;
}

/// Writes artifacts into a directory.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    clips: AtomicU64,
}

impl DirectorySink {
    /// Sink writing into `dir` (created on first write).
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            clips: AtomicU64::new(0),
        }
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn write(&self, file_name: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

#[async_trait]
impl ArtifactSink for DirectorySink {
    async fn play_audio(&self, wav: Vec<u8>) -> anyhow::Result<String> {
        let clip = self.clips.fetch_add(1, Ordering::Relaxed) + 1;
        let name = format!(
            "narration-{}-{clip}.wav",
            chrono::Utc::now().timestamp_millis()
        );
        let path = self.write(&name, &wav).await?;
        info!(path = %path.display(), bytes = wav.len(), "Narration saved");
        Ok(path.display().to_string())
    }

    async fn save_document(&self, file_name: &str, bytes: Vec<u8>) -> anyhow::Result<PathBuf> {
        let path = self.write(file_name, &bytes).await?;
        info!(path = %path.display(), bytes = bytes.len(), "Document saved");
        Ok(path)
    }
}

/// Keeps artifacts in memory, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    audio: Mutex<Vec<Vec<u8>>>,
    documents: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clips received so far.
    pub async fn audio(&self) -> Vec<Vec<u8>> {
        self.audio.lock().await.clone()
    }

    /// Documents received so far, with their file names.
    pub async fn documents(&self) -> Vec<(String, Vec<u8>)> {
        self.documents.lock().await.clone()
    }
}

#[async_trait]
impl ArtifactSink for MemorySink {
    async fn play_audio(&self, wav: Vec<u8>) -> anyhow::Result<String> {
        let mut audio = self.audio.lock().await;
        audio.push(wav);
        Ok(format!("memory:audio/{}", audio.len()))
    }

    async fn save_document(&self, file_name: &str, bytes: Vec<u8>) -> anyhow::Result<PathBuf> {
        self.documents
            .lock()
            .await
            .push((file_name.to_string(), bytes));
        Ok(PathBuf::from(file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn directory_sink_writes_files() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let sink = DirectorySink::new(tmp.path().join("out"));

        let location = sink.play_audio(vec![1, 2, 3]).await.expect("audio saved");
        assert!(location.ends_with("-1.wav"));
        assert_eq!(std::fs::read(&location).expect("readable"), vec![1, 2, 3]);

        let path = sink
            .save_document("project.pdf", b"%PDF-1.3".to_vec())
            .await
            .expect("document saved");
        assert_eq!(path, tmp.path().join("out").join("project.pdf"));
        assert_eq!(std::fs::read(path).expect("readable"), b"%PDF-1.3");
    }

    #[tokio::test]
    async fn memory_sink_records() {
        let sink = MemorySink::new();
        assert_eq!(
            sink.play_audio(vec![9]).await.expect("ok"),
            "memory:audio/1"
        );
        sink.save_document("a.pdf", vec![1]).await.expect("ok");
        assert_eq!(sink.audio().await, vec![vec![9]]);
        assert_eq!(sink.documents().await, vec![("a.pdf".to_string(), vec![1])]);
    }
}
