// Orchestrator: register -> build query -> save local copy -> submit.
//
// The pipeline never exits the process itself. It returns an `Outcome` or
// the first fatal `PipelineError`, and the binary turns that into an exit
// code. Saving the local copy is the only step allowed to fail silently.

use crate::api::{mask_token, ApiClient, ApiError, SubmissionReceipt};
use crate::config::Config;
use crate::query::{build_final_query, QueryVariant};
use crate::recorder::{preview, QueryRecorder};
use std::panic::{self, UnwindSafe};
use std::path::PathBuf;
use thiserror::Error;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// Fatal failures; each one aborts the run at the step that produced it.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("registration failed: {0}")]
    Registration(ApiError),

    #[error("registration returned no access token")]
    MissingToken,

    #[error("submission failed: {0}")]
    Submission(ApiError),
}

impl PipelineError {
    pub fn exit_code(&self) -> u8 {
        EXIT_FAILURE
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Where the query was submitted (returned webhook or the fallback).
    pub webhook_url: String,
    pub final_query: String,
    pub variant: QueryVariant,
    /// `None` when no recorder was set or saving failed.
    pub saved_to: Option<PathBuf>,
    pub receipt: SubmissionReceipt,
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        EXIT_SUCCESS
    }
}

/// Run `f` and reduce it to a process exit code. Errors and panics both map
/// to `EXIT_FAILURE`.
pub fn run_to_exit_code<F>(f: F) -> u8
where
    F: FnOnce() -> anyhow::Result<u8> + UnwindSafe,
{
    match panic::catch_unwind(f) {
        Ok(Ok(code)) => code,
        Ok(Err(e)) => {
            tracing::error!("Unexpected error in submission flow: {e:#}");
            EXIT_FAILURE
        }
        Err(_) => {
            tracing::error!("Submission flow panicked");
            EXIT_FAILURE
        }
    }
}

pub struct Pipeline<'a> {
    api: &'a ApiClient,
    config: &'a Config,
    recorder: Option<Box<dyn QueryRecorder + 'a>>,
}

impl<'a> Pipeline<'a> {
    /// A pipeline that keeps no local copy of the query.
    pub fn new(api: &'a ApiClient, config: &'a Config) -> Self {
        Pipeline {
            api,
            config,
            recorder: None,
        }
    }

    /// Save the query through `recorder` before submitting it.
    pub fn with_recorder(mut self, recorder: impl QueryRecorder + 'a) -> Self {
        self.recorder = Some(Box::new(recorder));
        self
    }

    pub fn run(&self) -> Result<Outcome, PipelineError> {
        tracing::info!("Submission flow begin");

        // 1) Register and obtain webhook + token
        let registration = self
            .api
            .register(&self.config.register_url, &self.config.identity)
            .map_err(|e| {
                tracing::error!(status = ?e.status(), error = %e, "Failed to generate webhook; aborting");
                PipelineError::Registration(e)
            })?;

        let Some(token) = registration.token() else {
            tracing::error!("No accessToken received; cannot proceed");
            return Err(PipelineError::MissingToken);
        };
        let webhook_url = registration.webhook_or(&self.config.fallback_webhook_url);
        tracing::info!(token = %mask_token(token), "Received webhook URL: {}", webhook_url);

        // 2) Build the answer
        let variant = QueryVariant::for_reg_no(&self.config.identity.reg_no);
        tracing::debug!(reg_no = %self.config.identity.reg_no, %variant, "Registration number variant");
        let final_query = build_final_query();

        // 3) Keep a local copy, best-effort
        let saved_to = self.recorder.as_ref().and_then(|recorder| {
            match recorder.record(&final_query) {
                Ok(path) => {
                    tracing::info!("Final SQL saved to {}. Preview:\n{}", path.display(), preview(&final_query));
                    Some(path)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Could not persist final query");
                    None
                }
            }
        });

        // 4) Submit with the token
        let receipt = self
            .api
            .submit(webhook_url, token, &final_query)
            .map_err(|e| {
                tracing::error!(status = ?e.status(), error = %e, "Submission failed");
                PipelineError::Submission(e)
            })?;
        tracing::info!(status = %receipt.status, "Submission complete");

        Ok(Outcome {
            webhook_url: webhook_url.to_string(),
            final_query,
            variant,
            saved_to,
            receipt,
        })
    }
}
