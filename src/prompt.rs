//! Prompt construction for structured extraction and text rewriting.
//!
//! The field list here is the single source of truth for the extraction
//! schema: the prompt enumerates it and the assembler projects the provider's
//! JSON onto it.

use crate::llm::{ChatMessage, ChatRequest, ResponseFormat};

/// Combined text is cut to this many characters before it is sent.
pub const MAX_PROMPT_CHARS: usize = 20_000;

const EXTRACTION_TEMPERATURE: f32 = 0.2;
const EXTRACTION_MAX_TOKENS: u32 = 500;
const REWRITE_TEMPERATURE: f32 = 0.4;
const REWRITE_MAX_TOKENS: u32 = 250;

/// Form fields grouped the way they appear on the application form.
pub const FIELD_GROUPS: &[(&str, &[&str])] = &[
    (
        "Personal / contact",
        &[
            "name",
            "email",
            "phone",
            "date_of_birth",
            "nationality",
            "address_line1",
            "address_line2",
            "city",
            "state_region",
            "country",
            "preferred_contact",
        ],
    ),
    (
        "Programme choice",
        &["level_of_study", "programme_interest", "study_mode", "intake"],
    ),
    (
        "Previous qualifications (highest completed qualification)",
        &[
            "highest_qualification",
            "highest_institution",
            "field_of_study",
            "graduation_year",
            "grade",
        ],
    ),
    ("Other academic info", &["other_qualifications"]),
    (
        "Work experience",
        &[
            "total_experience",
            "current_employer",
            "current_position",
            "industry",
            "experience_summary",
        ],
    ),
    ("Motivation / background", &["background_statement"]),
    ("AI helper", &["ai_notes"]),
];

/// Every extraction field, in form order.
pub const FORM_FIELDS: &[&str] = &[
    "name",
    "email",
    "phone",
    "date_of_birth",
    "nationality",
    "address_line1",
    "address_line2",
    "city",
    "state_region",
    "country",
    "preferred_contact",
    "level_of_study",
    "programme_interest",
    "study_mode",
    "intake",
    "highest_qualification",
    "highest_institution",
    "field_of_study",
    "graduation_year",
    "grade",
    "other_qualifications",
    "total_experience",
    "current_employer",
    "current_position",
    "industry",
    "experience_summary",
    "background_statement",
    "ai_notes",
];

const EXTRACTION_SYSTEM_PROMPT: &str = "You extract structured data from CVs and academic \
certificates to help fill university application forms. You must ALWAYS return valid JSON \
with the exact keys requested and avoid inventing information that is not supported by the text.";

const REWRITE_SYSTEM_PROMPT: &str = "You help applicants to rewrite motivation/background \
statements clearly, professionally and concisely for university admissions.";

const REWRITE_INSTRUCTION: &str = "Rewrite and improve the following motivation/background \
text, keeping all important information:\n\n";

/// Returns the first `max_chars` characters of `text` (not bytes).
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Builds the extraction request for already-truncated document text.
pub fn extraction_request(document_text: &str) -> ChatRequest {
    ChatRequest {
        messages: vec![
            ChatMessage::system(EXTRACTION_SYSTEM_PROMPT),
            ChatMessage::user(extraction_user_prompt(document_text)),
        ],
        temperature: EXTRACTION_TEMPERATURE,
        max_completion_tokens: EXTRACTION_MAX_TOKENS,
        response_format: Some(ResponseFormat::JsonObject),
    }
}

fn extraction_user_prompt(document_text: &str) -> String {
    let mut prompt = String::from(
        "You are assisting admissions staff at a university.\n\n\
         You are given text extracted from a student's CV and certificates,\n\
         combined from multiple documents. Using ONLY this information,\n\
         extract the following details where possible and return them as JSON.\n",
    );

    for (heading, fields) in FIELD_GROUPS {
        prompt.push('\n');
        prompt.push_str(heading);
        prompt.push_str(":\n");
        for field in *fields {
            prompt.push_str("- ");
            prompt.push_str(field);
            prompt.push('\n');
        }
    }

    prompt.push_str(
        "\nIf a field is not clearly available in the documents, return an empty string.\n\
         Do NOT invent details.\n\n\
         Return a single JSON object with exactly these keys:\n",
    );
    prompt.push_str(&FORM_FIELDS.join(", "));
    prompt.push_str(".\n\nTEXT FROM FOLDER (truncated):\n\"\"\"");
    prompt.push_str(document_text);
    prompt.push_str("\"\"\"\n");
    prompt
}

/// Builds the rewrite request for a free-text statement.
pub fn rewrite_request(raw_text: &str) -> ChatRequest {
    ChatRequest {
        messages: vec![
            ChatMessage::system(REWRITE_SYSTEM_PROMPT),
            ChatMessage::user(format!("{}{}", REWRITE_INSTRUCTION, raw_text)),
        ],
        temperature: REWRITE_TEMPERATURE,
        max_completion_tokens: REWRITE_MAX_TOKENS,
        response_format: None,
    }
}
