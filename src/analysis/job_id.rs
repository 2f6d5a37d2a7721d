use super::types::JobId;
use crate::error::AnalyzerError;
use regex::Regex;
use std::sync::OnceLock;

fn job_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // `$` is end of body: the identifier must close the response. CRLF mode
    // keeps `.` off `\r`, so a trailing carriage return is not an identifier.
    PATTERN.get_or_init(|| Regex::new(r"(?R)프로젝트 ID: (.+)$").expect("job id pattern is valid"))
}

/// Pulls the job identifier out of the upload response text.
pub fn extract_job_id(body: &str) -> Result<JobId, AnalyzerError> {
    let id = job_id_pattern()
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|id| !id.is_empty())
        .ok_or(AnalyzerError::MissingJobId)?;
    Ok(JobId::new(id))
}
