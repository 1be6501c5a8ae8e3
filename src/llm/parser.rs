//! Response parsing for LLM outputs.
//!
//! Extracts the JSON payload from LLM responses that may wrap it in markdown
//! code fences or surround it with prose.

/// Extracts the JSON payload from an LLM response.
///
/// Looks for JSON in the following forms, in order:
/// - ```json ... ``` fenced blocks
/// - ``` ... ``` fenced blocks whose content starts with `{` or `[`
/// - a bare object/array spanning the first `{`/`[` to the matching last
///   `}`/`]`
///
/// Returns `None` if no JSON-shaped payload can be located. The caller decides
/// whether that is a hard error.
pub fn extract_json_payload(response: &str) -> Option<String> {
    if let Some(block) = extract_code_block(response, "json") {
        return Some(block.trim().to_string());
    }

    if let Some(block) = extract_code_block(response, "") {
        let trimmed = block.trim();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            return Some(trimmed.to_string());
        }
    }

    extract_bare_json(response)
}

/// Extracts content from a markdown code block with the specified language.
///
/// Pass an empty string for `lang` to match blocks without a language
/// specifier.
fn extract_code_block(text: &str, lang: &str) -> Option<String> {
    let start_pattern = if lang.is_empty() {
        "```".to_string()
    } else {
        format!("```{}", lang)
    };

    let start_idx = text.find(&start_pattern)?;

    // Find the newline after the opening fence
    let content_start = text[start_idx + start_pattern.len()..]
        .find('\n')
        .map(|i| start_idx + start_pattern.len() + i + 1)?;

    // For generic blocks, make sure it's not actually a language-specific block
    if lang.is_empty() {
        let after_fence = &text[start_idx + 3..content_start - 1];
        if !after_fence.trim().is_empty() {
            return None;
        }
    }

    let end_idx = text[content_start..].find("```")?;

    Some(text[content_start..content_start + end_idx].to_string())
}

/// Extracts a bare JSON object or array from surrounding prose.
fn extract_bare_json(text: &str) -> Option<String> {
    let (open, close) = match (text.find('{'), text.find('[')) {
        (Some(obj), Some(arr)) if arr < obj => ('[', ']'),
        (Some(_), _) => ('{', '}'),
        (None, Some(_)) => ('[', ']'),
        (None, None) => return None,
    };

    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end <= start {
        return None;
    }

    Some(text[start..=end].to_string())
}
