mod format;
mod markup;

pub use format::format_summary;
pub use markup::{parse_markup, Block, BlockKind, Span};

use crate::analysis::AnalysisResult;

/// Display-ready projection of a successful analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub project_id: String,
    pub files_label: String,
    pub summary_markup: String,
    pub summary_blocks: Vec<Block>,
    pub timestamp: String,
}

impl ResultView {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let summary_markup = format_summary(result.summary_content.as_deref());
        let summary_blocks = parse_markup(&summary_markup);
        Self {
            project_id: result.project_id.clone().unwrap_or_default(),
            files_label: files_processed_label(result.files_processed),
            summary_markup,
            summary_blocks,
            timestamp: result.timestamp.clone().unwrap_or_default(),
        }
    }
}

pub fn files_processed_label(count: u64) -> String {
    format!("{}개 파일 처리됨", count)
}
