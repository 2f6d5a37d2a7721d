use thiserror::Error;

/// Everything that can end an analysis job or a clipboard action.
///
/// `Display` is the exact text shown in the error panel.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("업로드할 ZIP 파일을 선택해주세요.")]
    NoFileSelected,

    #[error("유효한 ZIP 파일만 지원됩니다: {0}")]
    NotZipFile(String),

    #[error("ZIP 파일을 업로드해주세요: {0} 파일이 비어 있습니다.")]
    EmptyFile(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status; carries the response body verbatim.
    #[error("{0}")]
    Protocol(String),

    #[error("프로젝트 ID를 찾을 수 없습니다.")]
    MissingJobId,

    #[error("{0}")]
    AnalysisFailed(String),

    #[error("결과 조회 중 오류가 발생했습니다: {0}")]
    ResultFetch(Box<AnalyzerError>),

    #[error("결과가 {0}회 조회 후에도 준비되지 않았습니다.")]
    PollLimitExceeded(u32),

    #[error("잘못된 서버 주소입니다: {0}")]
    InvalidServerUrl(String),

    #[error("파일을 읽을 수 없습니다: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("클립보드 복사에 실패했습니다: {0}")]
    Clipboard(#[from] arboard::Error),

    #[error("작업이 취소되었습니다.")]
    Cancelled,
}

impl AnalyzerError {
    /// Wraps a failure that happened while polling the results endpoint.
    pub fn during_poll(self) -> Self {
        match self {
            AnalyzerError::Cancelled => AnalyzerError::Cancelled,
            other => AnalyzerError::ResultFetch(Box::new(other)),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, AnalyzerError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_shows_body_verbatim() {
        let err = AnalyzerError::Protocol("요청 오류: 유효한 ZIP 파일만 지원됩니다".to_string());
        assert_eq!(err.to_string(), "요청 오류: 유효한 ZIP 파일만 지원됩니다");
    }

    #[test]
    fn poll_failures_get_prefixed() {
        let err = AnalyzerError::Protocol("서버 오류: boom".to_string()).during_poll();
        assert_eq!(err.to_string(), "결과 조회 중 오류가 발생했습니다: 서버 오류: boom");
    }

    #[test]
    fn cancellation_is_not_wrapped() {
        assert!(AnalyzerError::Cancelled.during_poll().is_cancelled());
    }
}
