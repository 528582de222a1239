use crate::types::{ResponseMode, StockCategory};
use serde_json::{json, Value};

/// Instruction for the free-text, five-field template.
pub const TEXT_INSTRUCTION: &str = "You are an expert SEO image caption writer for a stock photo platform like Shutterstock. \
Your task is to analyze an image and generate a Title, Description, two Categories, and Tags \
in English. The output must be highly relevant, engaging, and optimized with keywords \
that are frequently searched on Google Trends or stock photo platforms. \
The output must follow this exact format:\n\n\
Title: [Your SEO Title Here]\n\
Description: [Your detailed, keyword-rich description here]\n\
Category 1: [First category, e.g., Abstract]\n\
Category 2: [Second category, e.g., Technology]\n\
Tags: tag1, tag2, tag3, tag4, tag5, tag6, tag7, tag8, tag9, tag10 (Do NOT use a list or bullet points for tags, and use lowercase.)";

const JSON_INSTRUCTION_HEAD: &str = "You are an expert SEO image caption writer for a stock photo platform like Shutterstock. \
Analyze the image and describe it in English. Optimize every field for keywords that are \
frequently searched on Google Trends or stock photo platforms.\n\n\
Respond with a single JSON object and nothing else:\n\
{\"title\": string, \"description\": string, \"categories\": [string, string], \"keywords\": [string, ...]}\n\n\
- title: a concise SEO title, at most 200 characters\n\
- description: a detailed, keyword-rich description\n\
- categories: exactly two distinct values chosen from the allowed list below\n\
- keywords: 25 to 50 lowercase keywords, most relevant first, no duplicates\n\n\
Allowed categories: ";

/// Instruction text sent as `system_instruction` for the given mode.
pub fn system_instruction(mode: ResponseMode) -> String {
    match mode {
        ResponseMode::Text => TEXT_INSTRUCTION.to_string(),
        ResponseMode::Json => {
            format!("{}{}.", JSON_INSTRUCTION_HEAD, StockCategory::labels().join(", "))
        }
    }
}

/// `responseSchema` constraining JSON-mode output.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "description": { "type": "STRING" },
            "categories": {
                "type": "ARRAY",
                "items": {
                    "type": "STRING",
                    "enum": StockCategory::labels(),
                },
                "minItems": 2,
                "maxItems": 2,
            },
            "keywords": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
            },
        },
        "required": ["title", "description", "categories", "keywords"],
        "propertyOrdering": ["title", "description", "categories", "keywords"],
    })
}
