//! Remote Analysis Client: scores resume text with the LLM and always returns
//! a structurally valid `AnalysisReport`.
//!
//! Response policy: structural all-or-nothing. A response that does not
//! deserialize into a complete report is discarded for the fallback; there is
//! no per-field merging. Scores outside their range are clamped.

pub mod handlers;
pub mod prompts;
pub mod report;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::analysis::prompts::build_analysis_prompt;
use crate::llm_client::{LlmClient, LlmError};

pub use report::AnalysisReport;

/// Why a remote analysis fell back. Logged, never returned to callers.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no LLM API credential configured")]
    Configuration,

    #[error("transport failure: {0}")]
    Transport(LlmError),

    #[error("malformed response: {0}")]
    Format(LlmError),
}

impl From<LlmError> for AnalysisError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Http(_) | LlmError::Api { .. } => AnalysisError::Transport(e),
            LlmError::Parse(_) | LlmError::EmptyContent => AnalysisError::Format(e),
        }
    }
}

#[derive(Clone)]
pub struct RemoteAnalyzer {
    llm: Option<LlmClient>,
}

impl RemoteAnalyzer {
    /// `None` means no credential: every call returns the fallback without a network call.
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self { llm }
    }

    pub fn is_configured(&self) -> bool {
        self.llm.is_some()
    }

    /// Never fails: any error is logged and replaced by [`AnalysisReport::fallback`].
    pub async fn analyze(&self, resume_text: &str) -> AnalysisReport {
        match self.try_analyze(resume_text).await {
            Ok(report) => report,
            Err(e) => {
                error!("Remote analysis failed, returning fallback report: {e}");
                AnalysisReport::fallback()
            }
        }
    }

    async fn try_analyze(&self, resume_text: &str) -> Result<AnalysisReport, AnalysisError> {
        let llm = self.llm.as_ref().ok_or(AnalysisError::Configuration)?;

        let prompt = build_analysis_prompt(resume_text);
        let mut report: AnalysisReport = llm.chat_json(&prompt).await?;

        if !report.scores_in_range() {
            let repaired = report.clamp_scores();
            warn!("Clamped out-of-range scores: {}", repaired.join(", "));
        }

        info!(
            overall_score = report.overall_score,
            ats_match = report.ats_match,
            "Remote analysis succeeded"
        );
        Ok(report)
    }
}
