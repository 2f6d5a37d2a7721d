mod state;
mod ui;

use crate::analysis::{AnalyzerApi, PollSchedule};
use crate::config::Config;
use crate::utils::clipboard::SystemClipboard;
use eframe::{egui, App};
pub use state::{AnalysisSession, JobProgress};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tracing::info;

const ACTIVE_REPAINT_INTERVAL: Duration = Duration::from_millis(100);

pub struct ZipAnalyzer {
    config: Config,
    runtime: Runtime,
    api: Arc<dyn AnalyzerApi>,
    selected_file: Option<PathBuf>,
    session: AnalysisSession,
    clipboard: SystemClipboard,
}

impl ZipAnalyzer {
    pub fn new(config: Config, runtime: Runtime, api: Arc<dyn AnalyzerApi>) -> Self {
        info!("Initializing ZIP project analyzer");
        Self {
            config,
            runtime,
            api,
            selected_file: None,
            session: AnalysisSession::default(),
            clipboard: SystemClipboard,
        }
    }

    pub fn start_analysis(&mut self) {
        self.session.submit(
            self.selected_file.as_deref(),
            self.api.clone(),
            PollSchedule::from_config(&self.config),
            self.runtime.handle(),
        );
    }

    pub fn copy_analysis(&mut self) {
        self.session.copy_analysis(&mut self.clipboard, Instant::now());
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        if self.session.process_events() {
            ctx.request_repaint();
        }
        if self.session.is_loading() {
            ctx.request_repaint_after(ACTIVE_REPAINT_INTERVAL);
        }
        if let Some(left) = self.session.copy_feedback.remaining(Instant::now()) {
            ctx.request_repaint_after(left);
        }
    }
}

impl App for ZipAnalyzer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}

impl Drop for ZipAnalyzer {
    fn drop(&mut self) {
        self.session.cancel();
    }
}
