//! Core types for trivia-fetch

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Label of the catch-all entry at the head of every category list
pub const ALL_CATEGORIES: &str = "All";

/// Question difficulty as reported by the source
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Easy question
    Easy,
    /// Medium question
    Medium,
    /// Hard question
    Hard,
}

impl Difficulty {
    /// Query-string value understood by the source
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer format filter accepted by the source
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// Multiple choice (one correct, three incorrect answers)
    Multiple,
    /// True / false
    Boolean,
}

impl QuestionType {
    /// Query-string value understood by the source
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Multiple => "multiple",
            QuestionType::Boolean => "boolean",
        }
    }
}

/// Question object exactly as the source returns it
///
/// Text fields may still contain HTML character references. Values of this type
/// never leave the fetcher; they are decoded into [`QuestionRecord`]s first.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawQuestion {
    /// Category name
    pub category: String,
    /// Answer format ("multiple" or "boolean")
    #[serde(rename = "type")]
    pub question_type: String,
    /// Difficulty
    pub difficulty: Difficulty,
    /// Question text
    pub question: String,
    /// The correct answer
    pub correct_answer: String,
    /// The incorrect answers, in source order
    pub incorrect_answers: Vec<String>,
}

/// Response envelope returned by the source for one request
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiResponse {
    /// 0 on success, non-zero for a source-defined rejection
    pub response_code: u8,
    /// Questions; empty (or absent) on rejection
    #[serde(default)]
    pub results: Vec<RawQuestion>,
}

/// A decoded trivia question
///
/// Every text field holds display text with all character references resolved.
/// Records are immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    category: String,
    #[serde(rename = "type")]
    question_type: String,
    difficulty: Difficulty,
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

impl QuestionRecord {
    /// Build a record from already-decoded text
    pub fn new(
        category: impl Into<String>,
        question_type: impl Into<String>,
        difficulty: Difficulty,
        question: impl Into<String>,
        correct_answer: impl Into<String>,
        incorrect_answers: Vec<String>,
    ) -> Self {
        Self {
            category: category.into(),
            question_type: question_type.into(),
            difficulty,
            question: question.into(),
            correct_answer: correct_answer.into(),
            incorrect_answers,
        }
    }

    /// Category name
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Answer format ("multiple" or "boolean")
    pub fn question_type(&self) -> &str {
        &self.question_type
    }

    /// Difficulty
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Question text
    pub fn question(&self) -> &str {
        &self.question
    }

    /// The correct answer
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// The incorrect answers, in source order
    pub fn incorrect_answers(&self) -> &[String] {
        &self.incorrect_answers
    }

    /// All answers, correct answer first
    pub fn answers(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.correct_answer.as_str())
            .chain(self.incorrect_answers.iter().map(String::as_str))
    }
}

/// `["All"]` followed by the distinct categories of `questions`, sorted ascending
pub fn derive_categories(questions: &[QuestionRecord]) -> Vec<String> {
    let unique: BTreeSet<&str> = questions.iter().map(|q| q.category()).collect();

    std::iter::once(ALL_CATEGORIES.to_string())
        .chain(unique.into_iter().map(str::to_string))
        .collect()
}

/// Observable state of the data service
///
/// After the first request, exactly one of `loading`, `error.is_some()` or
/// "questions populated" holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchSnapshot {
    /// Total the snapshot belongs to (0 before the first request)
    pub total_amount: u32,
    /// Assembled questions, in batch arrival order
    pub questions: Arc<Vec<QuestionRecord>>,
    /// Derived category list, always starting with "All"
    pub categories: Vec<String>,
    /// A run is in flight
    pub loading: bool,
    /// Consumer-facing failure message
    pub error: Option<String>,
}

impl FetchSnapshot {
    /// State before any request has been made
    pub fn idle() -> Self {
        Self::with_questions(0, Arc::new(Vec::new()), false, None)
    }

    /// A run for `total_amount` has started
    pub fn loading(total_amount: u32) -> Self {
        Self::with_questions(total_amount, Arc::new(Vec::new()), true, None)
    }

    /// A run for `total_amount` produced `questions`
    pub fn ready(total_amount: u32, questions: Vec<QuestionRecord>) -> Self {
        Self::with_questions(total_amount, Arc::new(questions), false, None)
    }

    /// A run for `total_amount` failed; any previous data is dropped
    pub fn failed(total_amount: u32, message: impl Into<String>) -> Self {
        Self::with_questions(
            total_amount,
            Arc::new(Vec::new()),
            false,
            Some(message.into()),
        )
    }

    fn with_questions(
        total_amount: u32,
        questions: Arc<Vec<QuestionRecord>>,
        loading: bool,
        error: Option<String>,
    ) -> Self {
        let categories = derive_categories(&questions);
        Self {
            total_amount,
            questions,
            categories,
            loading,
            error,
        }
    }

    /// True when the snapshot holds a completed result set
    pub fn is_ready(&self) -> bool {
        !self.loading && self.error.is_none() && !self.questions.is_empty()
    }
}

impl Default for FetchSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}

/// Event emitted during a fetch run
///
/// Events carry progress counters only; question data is published through
/// [`FetchSnapshot`] once the full total has been gathered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A run started and the cache missed
    FetchStarted {
        /// Requested total
        total_amount: u32,
        /// Number of requests the run will issue
        batches: usize,
    },

    /// A cached result set was published without touching the network
    CacheHit {
        /// Requested total
        total_amount: u32,
    },

    /// One batch was received, validated and decoded
    BatchCompleted {
        /// Requested total
        total_amount: u32,
        /// Zero-based batch index
        batch: usize,
        /// Number of batches in the plan
        batches: usize,
        /// Records accumulated so far
        received: usize,
    },

    /// All batches arrived and the result set was published
    FetchCompleted {
        /// Requested total
        total_amount: u32,
        /// Unix timestamp of completion
        completed_at: i64,
    },

    /// The run failed and the error was published
    FetchFailed {
        /// Requested total
        total_amount: u32,
        /// Published error message
        error: String,
    },

    /// The run was superseded or torn down
    FetchCancelled {
        /// Requested total
        total_amount: u32,
    },
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn record(category: &str) -> QuestionRecord {
        QuestionRecord::new(
            category,
            "multiple",
            Difficulty::Easy,
            "Q?",
            "A",
            vec!["B".into(), "C".into(), "D".into()],
        )
    }

    #[test]
    fn categories_are_unique_sorted_and_prefixed_with_all() {
        let questions = vec![
            record("Science: Computers"),
            record("History"),
            record("Science: Computers"),
            record("Art"),
        ];

        assert_eq!(
            derive_categories(&questions),
            vec!["All", "Art", "History", "Science: Computers"]
        );
    }

    #[test]
    fn categories_of_empty_set_is_just_all() {
        assert_eq!(derive_categories(&[]), vec![ALL_CATEGORIES]);
    }

    #[test]
    fn snapshot_constructors_hold_exactly_one_state() {
        let loading = FetchSnapshot::loading(10);
        assert!(loading.loading && loading.error.is_none() && loading.questions.is_empty());

        let failed = FetchSnapshot::failed(10, "HTTP error! status: 500");
        assert!(!failed.loading && failed.error.is_some() && failed.questions.is_empty());
        assert_eq!(failed.categories, vec![ALL_CATEGORIES]);

        let ready = FetchSnapshot::ready(1, vec![record("Art")]);
        assert!(ready.is_ready());
        assert_eq!(ready.categories, vec!["All", "Art"]);
    }

    #[test]
    fn raw_question_parses_source_shape() {
        let json = r#"{
            "response_code": 0,
            "results": [{
                "category": "Entertainment: Video Games",
                "type": "boolean",
                "difficulty": "hard",
                "question": "&quot;Portal&quot; was released in 2007.",
                "correct_answer": "True",
                "incorrect_answers": ["False"]
            }]
        }"#;

        let response: ApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.response_code, 0);
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].question_type, "boolean");
        assert_eq!(response.results[0].difficulty, Difficulty::Hard);
    }

    #[test]
    fn rejected_response_may_omit_results() {
        let response: ApiResponse = serde_json::from_str(r#"{"response_code": 1}"#).unwrap();
        assert_eq!(response.response_code, 1);
        assert!(response.results.is_empty());
    }

    #[test]
    fn record_serializes_with_camel_case_keys() {
        let json = serde_json::to_value(record("Art")).unwrap();
        assert_eq!(json["correctAnswer"], "A");
        assert_eq!(json["type"], "multiple");
        assert_eq!(json["incorrectAnswers"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn answers_lists_correct_first() {
        let art = record("Art");
        let answers: Vec<&str> = art.answers().collect();
        assert_eq!(answers, vec!["A", "B", "C", "D"]);
    }
}
