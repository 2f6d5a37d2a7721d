use crate::analysis::{AnalysisJob, AnalysisResult, AnalyzerApi, JobEvent, JobId, PollSchedule, SelectedFile};
use crate::error::AnalyzerError;
use crate::summary::ResultView;
use crate::utils::clipboard::{ClipboardSink, CopyFeedback};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum JobProgress {
    #[default]
    Idle,
    Uploading {
        file_name: String,
    },
    Polling {
        job_id: JobId,
        attempts: u32,
    },
    Completed,
    Failed,
    Cancelled,
}

/// Everything the window shows about the current job. A new submission
/// replaces it wholesale.
#[derive(Default)]
pub struct AnalysisSession {
    pub progress: JobProgress,
    pub job_id: Option<JobId>,
    pub result: Option<ResultView>,
    pub analysis_content: String,
    pub error_message: Option<String>,
    pub alert: Option<String>,
    pub show_full_analysis: bool,
    pub copy_feedback: CopyFeedback,
    cancel: Option<CancellationToken>,
    event_receiver: Option<Receiver<JobEvent>>,
}

impl AnalysisSession {
    pub fn is_loading(&self) -> bool {
        matches!(
            self.progress,
            JobProgress::Uploading { .. } | JobProgress::Polling { .. }
        )
    }

    pub fn get_status_text(&self) -> String {
        match &self.progress {
            JobProgress::Uploading { file_name } => format!("📤 업로드 중: {}", file_name),
            JobProgress::Polling { job_id, attempts } => {
                format!("⏳ 분석 결과를 기다리는 중: {} ({}회 조회)", job_id, attempts)
            }
            _ => String::new(),
        }
    }

    fn validate(file: Option<&Path>) -> Result<SelectedFile, AnalyzerError> {
        let path = file.ok_or(AnalyzerError::NoFileSelected)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or(AnalyzerError::NoFileSelected)?;
        if !name.ends_with(".zip") {
            return Err(AnalyzerError::NotZipFile(name));
        }
        Ok(SelectedFile {
            path: path.to_path_buf(),
            name,
        })
    }

    /// Starts a new job for `file`, superseding any job still running.
    pub fn submit(
        &mut self,
        file: Option<&Path>,
        api: Arc<dyn AnalyzerApi>,
        schedule: PollSchedule,
        runtime: &Handle,
    ) {
        let file = match Self::validate(file) {
            Ok(file) => file,
            Err(e) => {
                warn!(error = %e, "submission rejected");
                self.error_message = Some(e.to_string());
                return;
            }
        };

        self.stop_job();
        self.result = None;
        self.error_message = None;
        self.job_id = None;
        self.analysis_content.clear();
        self.show_full_analysis = false;
        self.copy_feedback = CopyFeedback::default();
        self.progress = JobProgress::Uploading {
            file_name: file.name.clone(),
        };

        info!(file = %file.name, "starting analysis job");
        let (sender, receiver) = mpsc::channel();
        let cancel = CancellationToken::new();
        let job = AnalysisJob::new(api, schedule, cancel.clone(), sender);
        runtime.spawn(job.run_and_report(file));

        self.cancel = Some(cancel);
        self.event_receiver = Some(receiver);
    }

    /// Stops the running job, if any. Its later events are dropped.
    pub fn cancel(&mut self) {
        if self.is_loading() {
            info!("cancelling analysis job");
            self.progress = JobProgress::Cancelled;
        }
        self.stop_job();
    }

    fn stop_job(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        self.event_receiver = None;
    }

    /// Applies pending job events. Returns true when anything changed.
    pub fn process_events(&mut self) -> bool {
        let mut events = Vec::new();
        let mut disconnected = false;
        if let Some(receiver) = &self.event_receiver {
            loop {
                match receiver.try_recv() {
                    Ok(event) => events.push(event),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
        }

        let had_updates = !events.is_empty();
        for event in events {
            self.apply(event);
        }

        if disconnected {
            self.stop_job();
            if self.is_loading() {
                self.fail("분석 작업이 예기치 않게 종료되었습니다.".to_string());
                return true;
            }
        }
        had_updates
    }

    fn apply(&mut self, event: JobEvent) {
        match event {
            JobEvent::Uploaded(job_id) => {
                self.job_id = Some(job_id.clone());
                self.progress = JobProgress::Polling {
                    job_id,
                    attempts: 0,
                };
            }
            JobEvent::NotReady { attempts } => {
                if let JobProgress::Polling { attempts: current, .. } = &mut self.progress {
                    *current = attempts;
                }
            }
            JobEvent::Completed(result) => {
                self.stop_job();
                self.render(result);
            }
            JobEvent::Failed(message) => {
                self.stop_job();
                self.fail(message);
            }
        }
    }

    fn render(&mut self, result: AnalysisResult) {
        self.progress = JobProgress::Completed;
        self.error_message = None;
        self.result = Some(ResultView::from_result(&result));
        self.analysis_content = result.analysis_content.unwrap_or_default();
    }

    fn fail(&mut self, message: String) {
        self.progress = JobProgress::Failed;
        self.result = None;
        self.error_message = Some(message);
    }

    pub fn open_full_analysis(&mut self) {
        self.show_full_analysis = true;
    }

    pub fn copy_analysis(&mut self, clipboard: &mut dyn ClipboardSink, now: Instant) {
        match clipboard.set_text(&self.analysis_content) {
            Ok(()) => self.copy_feedback.acknowledge(now),
            Err(e) => {
                warn!(error = %e, "clipboard copy failed");
                self.alert = Some(e.to_string());
            }
        }
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }
}
