//! Candidate extraction from free-text model replies

use std::sync::OnceLock;

use regex::Regex;

fn fenced_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)```(?:python3?|py)?\s*(.*?)\s*```").expect("valid fenced block regex")
    })
}

fn code_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(import|from|def|class|driver|#)").expect("valid code start regex")
    })
}

fn fix_comment() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)(?:^|\s)#\s*(FIX:.*)$").expect("valid fix comment regex")
    })
}

/// Pull the script candidate out of a model reply.
///
/// The first fenced block wins. Without one, everything from the first
/// line that looks like Python (import/from/def/class/driver/comment) is
/// taken; if no line does, the whole reply is. An empty string means the
/// reply held no usable code.
pub fn extract_candidate(response: &str) -> String {
    if let Some(caps) = fenced_block().captures(response) {
        return caps
            .get(1)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
    }

    let lines: Vec<&str> = response.lines().collect();
    let start = lines
        .iter()
        .position(|line| code_start().is_match(line))
        .unwrap_or(0);

    lines[start..].join("\n").trim().to_string()
}

/// Collect the `# FIX:` comments of a script, whole-line or trailing.
///
/// The `#` must start the line or follow whitespace, so fragments inside
/// strings such as `"https://x/#FIX: y"` are not reported.
pub fn extract_fix_log(code: &str) -> Vec<String> {
    fix_comment()
        .captures_iter(code)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}
