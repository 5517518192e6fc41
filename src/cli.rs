use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::error::ThinkerError;
use crate::thinking::payload::OutputSlot;
use crate::thinking::pipeline::{
    DEFAULT_MODEL, FAILURE_PREFIX, ThinkInvocation, report_failure, run_pipeline,
};
use crate::thinking::prompts::ThoughtRequest;

#[derive(Debug, Parser)]
#[command(
    name = "thinker",
    version,
    about = "Analyze a message with Gemini and write the thought context as a framed binary file",
    override_usage = "thinker --message <text> --output <file> [--summary <text>] [--branch <label>] [--env <path>] [--model <model-name>] [--iteration <n>]",
    args_override_self = true
)]
pub struct Cli {
    /// User message to analyze.
    #[arg(long, value_name = "text", allow_hyphen_values = true)]
    pub message: Option<String>,
    /// Destination for the binary result payload.
    #[arg(long, value_name = "file", allow_hyphen_values = true)]
    pub output: Option<String>,
    /// Summary of the previous thought, if any.
    #[arg(long, value_name = "text", allow_hyphen_values = true)]
    pub summary: Option<String>,
    /// Label of the exploration branch being analyzed.
    #[arg(long, value_name = "label", allow_hyphen_values = true)]
    pub branch: Option<String>,
    /// KEY=VALUE file consulted when GEMINI_API_KEY is not set.
    #[arg(long, value_name = "path", allow_hyphen_values = true)]
    pub env: Option<String>,
    #[arg(
        long,
        value_name = "model-name",
        default_value = DEFAULT_MODEL,
        allow_hyphen_values = true
    )]
    pub model: String,
    #[arg(long, value_name = "n", default_value_t = 0, allow_negative_numbers = true)]
    pub iteration: i32,
}

impl Cli {
    pub fn into_invocation(self) -> Result<ThinkInvocation, ThinkerError> {
        let Some(message) = self.message.filter(|m| !m.is_empty()) else {
            return Err(ThinkerError::InvalidArgument(
                "Missing required argument --message".to_string(),
            ));
        };
        let Some(output) = self.output.filter(|o| !o.is_empty()) else {
            return Err(ThinkerError::InvalidArgument(
                "Missing required argument --output".to_string(),
            ));
        };

        Ok(ThinkInvocation {
            request: ThoughtRequest {
                message,
                summarized_thought: self.summary.unwrap_or_default(),
                branch_label: self.branch.unwrap_or_default(),
                iteration: self.iteration,
            },
            model: self.model,
            env_path: self.env.filter(|e| !e.is_empty()).map(PathBuf::from),
            output_path: PathBuf::from(output),
        })
    }
}

/// Parse an argument vector. `--help` and `--version` print and exit 0.
pub fn parse_invocation<I, T>(args: I) -> Result<ThinkInvocation, ThinkerError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => cli.into_invocation(),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            // clap appends usage and a `--help` hint; keep the first line only
            let rendered = err.to_string();
            let first = rendered.lines().next().unwrap_or_default();
            let text = first.trim().trim_start_matches("error: ");
            Err(ThinkerError::InvalidArgument(text.to_string()))
        }
    }
}

pub fn run() -> Result<()> {
    let inv = parse_invocation(std::env::args_os())?;
    let mut slot = OutputSlot::new(&inv.output_path);

    match run_pipeline(&inv, &mut slot) {
        Ok(_) => Ok(()),
        Err(failure) => {
            report_failure(&inv, &mut slot, &failure);
            Err(anyhow::Error::new(failure.error).context(FAILURE_PREFIX.trim_end_matches(": ")))
        }
    }
}
