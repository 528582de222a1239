//! Response parsing for both answer styles.
//!
//! JSON mode expects a single object with `title`, `description`,
//! `categories` and `keywords`. The schema normally guarantees a bare
//! object, but the parser still accepts:
//! 1. A pure JSON object
//! 2. The object inside a markdown code block
//! 3. The outermost `{...}` span within surrounding text
//!
//! Text mode follows the five-field template:
//!
//! ```text
//! Title: ...
//! Description: ...
//! Category 1: ...
//! Category 2: ...
//! Tags: a, b, c
//! ```

use crate::types::CaptionResult;

/// Parse a JSON-mode answer. Field values are kept exactly as returned.
pub fn parse_json_caption(response: &str) -> Result<CaptionResult, ParseError> {
    let trimmed = response.trim();

    if trimmed.is_empty() {
        return Err(ParseError::EmptyResponse);
    }

    let mut last_err = None;

    for candidate in json_candidates(trimmed) {
        match serde_json::from_str::<CaptionResult>(candidate) {
            Ok(result) => return validate(result),
            Err(e) => last_err = Some(e.to_string()),
        }
    }

    Err(ParseError::Malformed(
        last_err.unwrap_or_else(|| "no JSON object found".to_string()),
    ))
}

/// Parse a text-mode answer following the five-field template.
pub fn parse_text_caption(response: &str) -> Result<CaptionResult, ParseError> {
    let trimmed = response.trim();

    if trimmed.is_empty() {
        return Err(ParseError::EmptyResponse);
    }

    let mut result = CaptionResult::default();
    let mut raw_tags: Vec<&str> = Vec::new();
    let mut current = Field::None;

    for line in trimmed.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let labelled = split_field(line).and_then(|(label, value)| {
            let field = match label.as_str() {
                "title" => Field::Title,
                "description" => Field::Description,
                "category 1" | "category 2" | "category" => Field::Category,
                "tags" | "keywords" => Field::Tags,
                _ => return None,
            };
            Some((field, value))
        });

        match labelled {
            Some((field, value)) => {
                current = field;
                match field {
                    Field::Title => result.title = value.to_string(),
                    Field::Description => result.description = value.to_string(),
                    Field::Category => {
                        if !value.is_empty() {
                            result.categories.push(value.to_string());
                        }
                    }
                    Field::Tags => {
                        raw_tags.clear();
                        raw_tags.extend(value.split(','));
                    }
                    Field::None => {}
                }
            }
            // Unlabelled lines continue the field above them.
            None => {
                let text = line.trim();
                match current {
                    Field::Title => append_line(&mut result.title, text),
                    Field::Description => append_line(&mut result.description, text),
                    Field::Tags => raw_tags.extend(text.split(',')),
                    Field::Category | Field::None => {}
                }
            }
        }
    }

    result.keywords = clean_keywords(raw_tags.into_iter());

    validate(result)
}

/// Parse errors for caption responses.
#[derive(Debug)]
pub enum ParseError {
    /// The response was empty or whitespace-only
    EmptyResponse,
    /// The response was not a JSON object with the required keys
    Malformed(String),
    /// A required field was missing or blank
    MissingField(&'static str),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::EmptyResponse => write!(f, "Empty model response"),
            ParseError::Malformed(s) => write!(f, "Malformed caption JSON: {}", s),
            ParseError::MissingField(name) => write!(f, "Caption is missing '{}'", name),
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    None,
    Title,
    Description,
    Category,
    Tags,
}

fn append_line(field: &mut String, text: &str) {
    if !field.is_empty() {
        field.push(' ');
    }
    field.push_str(text);
}

fn validate(result: CaptionResult) -> Result<CaptionResult, ParseError> {
    if result.title.trim().is_empty() {
        return Err(ParseError::MissingField("title"));
    }
    if result.description.trim().is_empty() {
        return Err(ParseError::MissingField("description"));
    }
    Ok(result)
}

/// Candidate JSON snippets, most literal first.
fn json_candidates(text: &str) -> Vec<&str> {
    let mut out = vec![text];

    if let Some(block) = extract_code_block(text) {
        out.push(block);
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if end > start {
            out.push(&text[start..=end]);
        }
    }

    out
}

/// Content of the first fenced code block, if any.
fn extract_code_block(text: &str) -> Option<&str> {
    for marker in ["```json", "```JSON", "```"] {
        if let Some(start) = text.find(marker) {
            let content_start = start + marker.len();
            if let Some(end) = text[content_start..].find("```") {
                return Some(text[content_start..content_start + end].trim());
            }
        }
    }
    None
}

/// Split `Label: value`, tolerating markdown emphasis around the label.
fn split_field(line: &str) -> Option<(String, &str)> {
    let line = line.trim().trim_start_matches(['-', '*', '#']).trim_start();
    let (label, value) = line.split_once(':')?;
    let label = label.trim().trim_matches('*').trim().to_ascii_lowercase();
    let value = value.trim().trim_start_matches('*').trim();
    Some((label, value))
}

/// Trim, lowercase, drop empties and duplicates, keep order.
fn clean_keywords<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.map(|t| t.trim().trim_matches('"').trim().to_lowercase())
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}
