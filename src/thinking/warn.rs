pub struct WarnEvent<'a> {
    pub code: &'a str,
    pub stage: &'a str,
    pub model: &'a str,
    pub iteration: i32,
    pub err: &'a str,
}

fn sanitize_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_sep = false;
    for ch in value.chars() {
        if ch.is_whitespace() {
            if !out.is_empty() && !prev_sep {
                out.push('_');
                prev_sep = true;
            }
        } else if !ch.is_control() {
            out.push(ch);
            prev_sep = false;
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "na".to_string()
    } else {
        trimmed.to_string()
    }
}

fn format_warn(event: &WarnEvent<'_>) -> String {
    format!(
        "THINKER_WARN code={} stage={} model={} iteration={} err={}",
        sanitize_value(event.code),
        sanitize_value(event.stage),
        sanitize_value(event.model),
        event.iteration,
        sanitize_value(event.err),
    )
}

pub fn emit(event: WarnEvent<'_>) {
    eprintln!("{}", format_warn(&event));
}

/// Progress record, printed only when tracing is enabled.
pub fn trace(enabled: bool, stage: &str, fields: &[(&str, String)]) {
    if !enabled {
        return;
    }
    let mut line = format!("THINKER_TRACE stage={}", sanitize_value(stage));
    for (key, value) in fields {
        line.push_str(&format!(" {key}={}", sanitize_value(value)));
    }
    eprintln!("{line}");
}
