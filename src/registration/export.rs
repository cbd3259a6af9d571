//! Registration export artifacts and the capability used to persist them.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{ClientError, ClientResult};

/// Named byte artifact handed to the host's save mechanism
#[derive(Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ExportArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportArtifact")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ExportArtifact {
    pub const XML_CONTENT_TYPE: &'static str = "application/xml";

    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Suggested file name for a student's XML export
    #[must_use]
    pub fn default_file_name(student_id: &str) -> String {
        format!("registration_{}.xml", student_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Host capability that stores an exported artifact somewhere the user can reach it
pub trait ArtifactSink: Send + Sync {
    /// Persist the artifact, returning where it ended up
    fn save(&self, artifact: &ExportArtifact) -> ClientResult<PathBuf>;
}

/// Saves artifacts as files in a directory
#[derive(Debug, Clone)]
pub struct FileArtifactSink {
    dir: PathBuf,
}

impl FileArtifactSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Strip anything that could escape the target directory
fn sanitize_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && *c != ':')
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').to_string();
    (!cleaned.is_empty()).then_some(cleaned)
}

impl ArtifactSink for FileArtifactSink {
    fn save(&self, artifact: &ExportArtifact) -> ClientResult<PathBuf> {
        let file_name = sanitize_file_name(&artifact.file_name).ok_or_else(|| {
            ClientError::InvalidInput(format!(
                "Unusable export file name: {:?}",
                artifact.file_name
            ))
        })?;

        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, &artifact.bytes)?;

        info!(
            path = %path.display(),
            bytes = artifact.bytes.len(),
            "Saved registration export"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_sink_writes_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let sink = FileArtifactSink::new(temp_dir.path().join("exports"));
        let artifact = ExportArtifact::new(
            ExportArtifact::default_file_name("S1"),
            ExportArtifact::XML_CONTENT_TYPE,
            b"<registration/>".to_vec(),
        );

        let path = sink.save(&artifact).unwrap();
        assert_eq!(path.file_name().unwrap(), "registration_S1.xml");
        assert_eq!(std::fs::read(&path).unwrap(), b"<registration/>");
    }

    #[test]
    fn test_file_sink_strips_directories() {
        let temp_dir = TempDir::new().unwrap();
        let sink = FileArtifactSink::new(temp_dir.path());
        let artifact = ExportArtifact::new("../../etc/registration_S2.xml", "application/xml", vec![]);

        let path = sink.save(&artifact).unwrap();
        assert_eq!(path, temp_dir.path().join("registration_S2.xml"));
    }

    #[test]
    fn test_file_sink_rejects_empty_name() {
        let temp_dir = TempDir::new().unwrap();
        let sink = FileArtifactSink::new(temp_dir.path());
        let artifact = ExportArtifact::new("../", "application/xml", vec![1]);
        assert!(sink.save(&artifact).is_err());
    }
}
