use crate::error::ThinkerError;
use serde::Serialize;

/// Inputs for one thinking step, as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThoughtRequest {
    pub message: String,
    pub summarized_thought: String,
    pub branch_label: String,
    pub iteration: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub response_mime_type: &'static str,
}

pub const ANALYSIS_GENERATION: GenerationConfig = GenerationConfig {
    temperature: 0.2,
    top_p: 0.9,
    max_output_tokens: 1024,
    response_mime_type: "application/json",
};

pub const SUMMARY_GENERATION: GenerationConfig = GenerationConfig {
    temperature: 0.4,
    top_p: 0.9,
    max_output_tokens: 256,
    response_mime_type: "text/plain",
};

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

const SCHEMA_BLOCK: &str = "\
You are an intelligent AI classifier.
Analyze the user's message and produce a JSON object with the following fields:
{
  \"user_enquiry\": string,
  \"user_name\": string,
  \"needs_command\": boolean,
  \"client_platform\": string,
  \"category\": string,
  \"branch_label\": string,
  \"steps_for_completion\": string,
  \"possible_setbacks\": string,
  \"probability_of_success\": number,
  \"potential_score\": number,
  \"date_of_request\": string (ISO 8601),
  \"is_done_thinking\": boolean,
  \"regrets_choice\": boolean
}
\"possible_setbacks\" must concisely list the primary risks, trade-offs, or downsides of the plan.
\"probability_of_success\" must be a float between 0.0 and 1.0 describing the likelihood this branch succeeds.
\"potential_score\" must be a float increment (positive or negative) to add to the cumulative potential score for the overall search.
Ensure at least two distinct branch possibilities are explored across the wider reasoning process.
";

pub fn build_analysis_prompt(req: &ThoughtRequest) -> String {
    let last_thought = if req.summarized_thought.is_empty() {
        "None"
    } else {
        req.summarized_thought.as_str()
    };
    let branch = if req.branch_label.is_empty() {
        "Primary"
    } else {
        req.branch_label.as_str()
    };

    let mut prompt = String::with_capacity(SCHEMA_BLOCK.len() + req.message.len() + 512);
    prompt.push_str(SCHEMA_BLOCK);
    prompt.push_str(&format!(
        "Use the following context for iteration {}:\n",
        req.iteration
    ));
    prompt.push_str(&format!("[LAST THOUGHT]\n{last_thought}\n"));
    prompt.push_str(&format!("[BRANCH LABEL]\n{branch}\n"));
    prompt.push_str(
        "Focus all analysis on the branch identified in [BRANCH LABEL] while keeping sibling branches distinct.\n",
    );
    prompt.push_str(&format!("[USER MESSAGE]\n{}\n", req.message));
    prompt.push_str("Ensure the response is valid JSON and nothing else.");
    prompt
}

pub fn build_summary_prompt(context_json: &str) -> String {
    format!(
        "Summarize the thought process and decisions concisely in first person based on this JSON context:\n{context_json}"
    )
}

fn build_payload(prompt: &str, generation: GenerationConfig) -> Result<String, ThinkerError> {
    let request = GenerateContentRequest {
        contents: [Content {
            role: "user",
            parts: [Part { text: prompt }],
        }],
        generation_config: generation,
    };
    serde_json::to_string_pretty(&request)
        .map_err(|err| ThinkerError::Io(format!("failed to encode request payload: {err}")))
}

pub fn build_analysis_payload(prompt: &str) -> Result<String, ThinkerError> {
    build_payload(prompt, ANALYSIS_GENERATION)
}

pub fn build_summary_payload(prompt: &str) -> Result<String, ThinkerError> {
    build_payload(prompt, SUMMARY_GENERATION)
}
