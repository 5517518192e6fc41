use crate::error::ThinkerError;
use crate::thinking::config::load_config;
use crate::thinking::credentials::resolve_api_key;
use crate::thinking::gemini::{GeminiClient, extract_text};
use crate::thinking::payload::{OutputSlot, ThoughtPayload};
use crate::thinking::prompts::{
    ThoughtRequest, build_analysis_payload, build_analysis_prompt, build_summary_payload,
    build_summary_prompt,
};
use crate::thinking::warn;
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";
pub const FAILURE_PREFIX: &str = "Thinking process failed: ";

#[derive(Debug, Clone)]
pub struct ThinkInvocation {
    pub request: ThoughtRequest,
    pub model: String,
    pub env_path: Option<PathBuf>,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Credentials,
    Transport,
    Analysis,
    Summary,
    Output,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Config => "config",
            Stage::Credentials => "credentials",
            Stage::Transport => "transport",
            Stage::Analysis => "analysis",
            Stage::Summary => "summary",
            Stage::Output => "output",
        }
    }
}

#[derive(Debug)]
pub struct StageFailure {
    pub stage: Stage,
    pub error: ThinkerError,
}

fn at(stage: Stage) -> impl FnOnce(ThinkerError) -> StageFailure {
    move |error| StageFailure { stage, error }
}

fn ask(
    client: &GeminiClient,
    api_key: &str,
    model: &str,
    payload: &str,
    trace: bool,
    stage: Stage,
) -> Result<String, ThinkerError> {
    warn::trace(
        trace,
        stage.as_str(),
        &[("request_bytes", payload.len().to_string())],
    );
    let body = client.call(api_key, model, payload)?;
    let text = extract_text(&body)?;
    warn::trace(
        trace,
        stage.as_str(),
        &[
            ("response_bytes", body.len().to_string()),
            ("text_bytes", text.len().to_string()),
        ],
    );
    Ok(text)
}

/// Analysis call, then summary call, then commit the success payload.
pub fn run_pipeline(
    inv: &ThinkInvocation,
    slot: &mut OutputSlot,
) -> Result<ThoughtPayload, StageFailure> {
    let cfg = load_config().map_err(at(Stage::Config))?;
    let api_key = resolve_api_key(inv.env_path.as_deref()).map_err(at(Stage::Credentials))?;
    let client = GeminiClient::new(&cfg).map_err(at(Stage::Transport))?;

    let analysis_prompt = build_analysis_prompt(&inv.request);
    let context_json = build_analysis_payload(&analysis_prompt)
        .and_then(|payload| {
            ask(
                &client,
                &api_key,
                &inv.model,
                &payload,
                cfg.trace,
                Stage::Analysis,
            )
        })
        .map_err(at(Stage::Analysis))?;

    let summary_prompt = build_summary_prompt(&context_json);
    let summary = build_summary_payload(&summary_prompt)
        .and_then(|payload| {
            ask(
                &client,
                &api_key,
                &inv.model,
                &payload,
                cfg.trace,
                Stage::Summary,
            )
        })
        .map_err(at(Stage::Summary))?;

    let payload = ThoughtPayload::success(context_json, summary);
    slot.commit(&payload).map_err(at(Stage::Output))?;
    warn::trace(
        cfg.trace,
        Stage::Output.as_str(),
        &[("path", slot.path().display().to_string())],
    );
    Ok(payload)
}

/// Record a failed run: write the failure payload unless a payload already
/// landed, and emit the warn record. Errors while writing are dropped.
pub fn report_failure(inv: &ThinkInvocation, slot: &mut OutputSlot, failure: &StageFailure) {
    if !slot.is_written() {
        let message = format!("{FAILURE_PREFIX}{}", failure.error);
        let _ = slot.commit(&ThoughtPayload::failure(message));
    }
    warn::emit(warn::WarnEvent {
        code: failure.error.code(),
        stage: failure.stage.as_str(),
        model: &inv.model,
        iteration: inv.request.iteration,
        err: &failure.error.to_string(),
    });
}
