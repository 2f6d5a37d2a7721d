use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payload of `GET /results/{projectId}`.
///
/// Failed jobs come back with nulls in most string fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisResult {
    pub success: bool,
    pub project_id: Option<String>,
    pub files_processed: u64,
    pub summary_content: Option<String>,
    pub analysis_content: Option<String>,
    pub timestamp: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug)]
pub enum PollOutcome {
    NotReady,
    Ready(AnalysisResult),
}

/// A ZIP archive picked by the user, validated by name only.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
}

#[derive(Debug, Clone)]
pub enum JobEvent {
    Uploaded(JobId),
    NotReady { attempts: u32 },
    Completed(AnalysisResult),
    Failed(String),
}
