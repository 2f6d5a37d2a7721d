use super::client::AnalyzerApi;
use super::job_id::extract_job_id;
use super::types::{AnalysisResult, JobEvent, JobId, PollOutcome, SelectedFile};
use crate::config::Config;
use crate::error::AnalyzerError;
use std::future::Future;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const UNKNOWN_FAILURE: &str = "알 수 없는 오류가 발생했습니다.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
}

impl PollSchedule {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.poll_interval(),
            max_attempts: config.max_poll_attempts,
        }
    }
}

/// One upload followed by a poll loop, reporting progress over `events`.
pub struct AnalysisJob {
    api: Arc<dyn AnalyzerApi>,
    schedule: PollSchedule,
    cancel: CancellationToken,
    events: Sender<JobEvent>,
}

impl AnalysisJob {
    pub fn new(
        api: Arc<dyn AnalyzerApi>,
        schedule: PollSchedule,
        cancel: CancellationToken,
        events: Sender<JobEvent>,
    ) -> Self {
        Self {
            api,
            schedule,
            cancel,
            events,
        }
    }

    /// Runs the job and sends its terminal event. Cancellation ends silently.
    pub async fn run_and_report(self, file: SelectedFile) {
        let events = self.events.clone();
        match self.run(file).await {
            Ok(result) => {
                events.send(JobEvent::Completed(result)).unwrap_or_default();
            }
            Err(e) if e.is_cancelled() => {
                info!("analysis job cancelled");
            }
            Err(e) => {
                warn!(error = %e, "analysis job failed");
                events.send(JobEvent::Failed(e.to_string())).unwrap_or_default();
            }
        }
    }

    pub async fn run(self, file: SelectedFile) -> Result<AnalysisResult, AnalyzerError> {
        let content = self.cancellable(tokio::fs::read(&file.path)).await??;
        if content.is_empty() {
            return Err(AnalyzerError::EmptyFile(file.name));
        }

        info!(file = %file.name, bytes = content.len(), "uploading project archive");
        let body = self
            .cancellable(self.api.upload(&file.name, content))
            .await??;
        let job_id = extract_job_id(&body)?;
        info!(%job_id, "upload accepted");
        self.events
            .send(JobEvent::Uploaded(job_id.clone()))
            .unwrap_or_default();

        self.poll(&job_id).await
    }

    async fn poll(&self, job_id: &JobId) -> Result<AnalysisResult, AnalyzerError> {
        let mut attempts = 0u32;
        loop {
            if let Some(max) = self.schedule.max_attempts {
                if attempts >= max {
                    return Err(AnalyzerError::PollLimitExceeded(max));
                }
            }

            self.cancellable(tokio::time::sleep(self.schedule.interval))
                .await?;
            attempts += 1;

            let outcome = self
                .cancellable(self.api.fetch_result(job_id))
                .await?
                .map_err(AnalyzerError::during_poll)?;

            match outcome {
                PollOutcome::NotReady => {
                    debug!(%job_id, attempts, "result not ready");
                    self.events
                        .send(JobEvent::NotReady { attempts })
                        .unwrap_or_default();
                }
                PollOutcome::Ready(result) if !result.success => {
                    let message = result
                        .error
                        .filter(|e| !e.is_empty())
                        .unwrap_or_else(|| UNKNOWN_FAILURE.to_string());
                    return Err(AnalyzerError::AnalysisFailed(message));
                }
                PollOutcome::Ready(result) => {
                    info!(%job_id, attempts, files = result.files_processed, "analysis completed");
                    return Ok(result);
                }
            }
        }
    }

    async fn cancellable<F: Future>(&self, fut: F) -> Result<F::Output, AnalyzerError> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(AnalyzerError::Cancelled),
            output = fut => Ok(output),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::sync::Mutex;
    use tempfile::TempDir;

    pub enum Scripted {
        NotReady,
        Ready(AnalysisResult),
        Error(AnalyzerError),
    }

    /// Answers uploads with a fixed body and polls from a script.
    /// An exhausted script keeps answering "not ready".
    pub struct FakeApi {
        pub upload_body: Result<String, String>,
        pub polls: Mutex<VecDeque<Scripted>>,
        pub uploads: AtomicUsize,
        pub fetches: AtomicUsize,
    }

    impl FakeApi {
        pub fn new(upload_body: &str, polls: Vec<Scripted>) -> Self {
            Self {
                upload_body: Ok(upload_body.to_string()),
                polls: Mutex::new(polls.into()),
                uploads: AtomicUsize::new(0),
                fetches: AtomicUsize::new(0),
            }
        }

        pub fn rejecting_upload(body: &str) -> Self {
            Self {
                upload_body: Err(body.to_string()),
                ..Self::new("", Vec::new())
            }
        }
    }

    #[async_trait]
    impl AnalyzerApi for FakeApi {
        async fn upload(&self, _file_name: &str, _content: Vec<u8>) -> Result<String, AnalyzerError> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            self.upload_body.clone().map_err(AnalyzerError::Protocol)
        }

        async fn fetch_result(&self, _job_id: &JobId) -> Result<PollOutcome, AnalyzerError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let next = self.polls.lock().unwrap().pop_front();
            match next {
                None | Some(Scripted::NotReady) => Ok(PollOutcome::NotReady),
                Some(Scripted::Ready(result)) => Ok(PollOutcome::Ready(result)),
                Some(Scripted::Error(e)) => Err(e),
            }
        }
    }

    pub fn completed_result() -> AnalysisResult {
        AnalysisResult {
            success: true,
            project_id: Some("demo_20240101_120000".to_string()),
            files_processed: 5,
            summary_content: Some("# Title\n- item".to_string()),
            analysis_content: Some("full analysis".to_string()),
            timestamp: Some("2024-01-01 12:00:05".to_string()),
            error: None,
        }
    }

    pub fn zip_file(dir: &TempDir) -> SelectedFile {
        let path = dir.path().join("demo.zip");
        fs::write(&path, b"PK\x03\x04").unwrap();
        SelectedFile {
            path,
            name: "demo.zip".to_string(),
        }
    }

    pub const UPLOAD_OK: &str =
        "프로젝트가 업로드되어 분석 대기열에 추가되었습니다. 프로젝트 ID: demo_20240101_120000";

    fn fast_schedule(max_attempts: Option<u32>) -> PollSchedule {
        PollSchedule {
            interval: Duration::from_millis(1),
            max_attempts,
        }
    }

    fn job(
        api: Arc<FakeApi>,
        max_attempts: Option<u32>,
    ) -> (AnalysisJob, mpsc::Receiver<JobEvent>, CancellationToken) {
        let (sender, receiver) = mpsc::channel();
        let cancel = CancellationToken::new();
        let job = AnalysisJob::new(api, fast_schedule(max_attempts), cancel.clone(), sender);
        (job, receiver, cancel)
    }

    #[tokio::test]
    async fn polls_through_not_ready_until_result() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(FakeApi::new(
            UPLOAD_OK,
            vec![
                Scripted::NotReady,
                Scripted::NotReady,
                Scripted::NotReady,
                Scripted::Ready(completed_result()),
            ],
        ));
        let (job, events, _) = job(api.clone(), None);

        let result = job.run(zip_file(&dir)).await.unwrap();
        assert_eq!(result.files_processed, 5);
        assert_eq!(api.fetches.load(Ordering::SeqCst), 4);

        let events: Vec<JobEvent> = events.try_iter().collect();
        assert!(matches!(&events[0], JobEvent::Uploaded(id) if id.as_str() == "demo_20240101_120000"));
        let not_ready = events
            .iter()
            .filter(|e| matches!(e, JobEvent::NotReady { .. }))
            .count();
        assert_eq!(not_ready, 3);
    }

    #[tokio::test]
    async fn missing_job_id_skips_polling() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(FakeApi::new("upload accepted", Vec::new()));
        let (job, _, _) = job(api.clone(), None);

        let err = job.run(zip_file(&dir)).await.unwrap_err();
        assert!(matches!(err, AnalyzerError::MissingJobId));
        assert_eq!(api.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn upload_rejection_surfaces_body() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(FakeApi::rejecting_upload("요청 오류: 유효한 ZIP 파일만 지원됩니다"));
        let (job, _, _) = job(api, None);

        let err = job.run(zip_file(&dir)).await.unwrap_err();
        assert_eq!(err.to_string(), "요청 오류: 유효한 ZIP 파일만 지원됩니다");
    }

    #[tokio::test]
    async fn unsuccessful_analysis_reports_server_error() {
        let dir = TempDir::new().unwrap();
        let failed = AnalysisResult {
            success: false,
            error: Some("bad zip".to_string()),
            ..AnalysisResult::default()
        };
        let api = Arc::new(FakeApi::new(UPLOAD_OK, vec![Scripted::Ready(failed)]));
        let (job, _, _) = job(api, None);

        let err = job.run(zip_file(&dir)).await.unwrap_err();
        assert_eq!(err.to_string(), "bad zip");
    }

    #[tokio::test]
    async fn unsuccessful_analysis_without_message_uses_fallback() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(FakeApi::new(
            UPLOAD_OK,
            vec![Scripted::Ready(AnalysisResult::default())],
        ));
        let (job, _, _) = job(api, None);

        let err = job.run(zip_file(&dir)).await.unwrap_err();
        assert_eq!(err.to_string(), UNKNOWN_FAILURE);
    }

    #[tokio::test]
    async fn server_error_during_poll_stops_with_prefix() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(FakeApi::new(
            UPLOAD_OK,
            vec![
                Scripted::NotReady,
                Scripted::Error(AnalyzerError::Protocol("서버 오류: disk full".to_string())),
                Scripted::Ready(completed_result()),
            ],
        ));
        let (job, _, _) = job(api.clone(), None);

        let err = job.run(zip_file(&dir)).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "결과 조회 중 오류가 발생했습니다: 서버 오류: disk full"
        );
        assert_eq!(api.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn attempt_limit_ends_the_loop() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(FakeApi::new(UPLOAD_OK, Vec::new()));
        let (job, _, _) = job(api.clone(), Some(3));

        let err = job.run(zip_file(&dir)).await.unwrap_err();
        assert!(matches!(err, AnalyzerError::PollLimitExceeded(3)));
        assert_eq!(api.fetches.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn cancellation_stops_an_endless_poll() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(FakeApi::new(UPLOAD_OK, Vec::new()));
        let (job, events, cancel) = job(api.clone(), None);

        let handle = tokio::spawn(job.run_and_report(zip_file(&dir)));
        tokio::time::sleep(Duration::from_millis(30)).await;
        cancel.cancel();
        handle.await.unwrap();

        let fetches = api.fetches.load(Ordering::SeqCst);
        assert!(fetches > 0);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(api.fetches.load(Ordering::SeqCst), fetches);

        let terminal = events
            .try_iter()
            .any(|e| matches!(e, JobEvent::Completed(_) | JobEvent::Failed(_)));
        assert!(!terminal);
    }

    #[tokio::test]
    async fn empty_archive_is_not_uploaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.zip");
        fs::write(&path, b"").unwrap();
        let api = Arc::new(FakeApi::new(UPLOAD_OK, Vec::new()));
        let (job, _, _) = job(api.clone(), None);

        let err = job
            .run(SelectedFile {
                path,
                name: "empty.zip".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::EmptyFile(_)));
        assert_eq!(api.uploads.load(Ordering::SeqCst), 0);
    }
}
