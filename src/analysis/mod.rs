mod client;
mod job;
mod job_id;
mod types;

pub use client::{AnalyzerApi, HttpAnalyzerClient};
pub use job::{AnalysisJob, PollSchedule};
pub use types::{AnalysisResult, JobEvent, JobId, SelectedFile};

#[cfg(test)]
pub(crate) use job::tests as fakes;
