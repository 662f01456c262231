//! HTML character reference decoding for source-supplied text
//!
//! The question source HTML-encodes every text field (`&quot;`, `&#039;`,
//! `&eacute;`, ...). Decoding is display-only: it never fails, and any
//! reference it cannot resolve is left in the output untouched.

use crate::types::{QuestionRecord, RawQuestion};

/// Resolve all named and numeric character references in `text`
///
/// Text without references is returned unchanged. Unknown or malformed
/// references are kept verbatim.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let decoded = html_escape::decode_html_entities(text);
    if decoded == text && text.contains(';') {
        tracing::trace!(text, "text left unchanged by character reference decoding");
    }
    decoded.into_owned()
}

/// Decode every text field of a raw source question
pub fn decode_question(raw: RawQuestion) -> QuestionRecord {
    QuestionRecord::new(
        decode_entities(&raw.category),
        decode_entities(&raw.question_type),
        raw.difficulty,
        decode_entities(&raw.question),
        decode_entities(&raw.correct_answer),
        raw.incorrect_answers
            .iter()
            .map(|answer| decode_entities(answer))
            .collect(),
    )
}
