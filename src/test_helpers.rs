//! Shared fakes for unit tests: a scripted question source and record builders.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

use crate::error::{Error, Result};
use crate::source::QuestionSource;
use crate::types::{ApiResponse, Difficulty, RawQuestion};

/// Scripted reply for one call to [`FakeSource::fetch_batch`]
#[derive(Clone, Debug)]
pub(crate) enum Reply {
    /// `amount` questions tagged with the call index
    Questions,
    /// Fewer questions than requested, with a success code
    Short(usize),
    /// Non-success HTTP status
    Status(u16),
    /// Success status carrying a non-zero response code
    Code(u8),
    /// Never answers
    Hang,
}

/// One recorded call
#[derive(Clone, Debug)]
pub(crate) struct Call {
    pub(crate) amount: u32,
    pub(crate) at: Instant,
}

/// Question source that replays a script and records every call
///
/// Once the script runs out every call gets [`Reply::Questions`].
#[derive(Default)]
pub(crate) struct FakeSource {
    script: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeSource {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn scripted(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn amounts(&self) -> Vec<u32> {
        self.calls().iter().map(|c| c.amount).collect()
    }
}

#[async_trait]
impl QuestionSource for FakeSource {
    async fn fetch_batch(&self, amount: u32) -> Result<ApiResponse> {
        let batch = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Call {
                amount,
                at: Instant::now(),
            });
            calls.len() - 1
        };
        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Questions);

        match reply {
            Reply::Questions => Ok(ApiResponse {
                response_code: 0,
                results: raw_batch(batch, amount as usize),
            }),
            Reply::Short(n) => Ok(ApiResponse {
                response_code: 0,
                results: raw_batch(batch, n),
            }),
            Reply::Status(status) => Err(Error::Transport { status }),
            Reply::Code(code) => Ok(ApiResponse {
                response_code: code,
                results: Vec::new(),
            }),
            Reply::Hang => std::future::pending().await,
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// `n` entity-encoded raw questions; question text is `"B{batch} Q{i} &amp; co"`
pub(crate) fn raw_batch(batch: usize, n: usize) -> Vec<RawQuestion> {
    const CATEGORIES: [&str; 3] = ["Science &amp; Nature", "History", "Art"];

    (0..n)
        .map(|i| RawQuestion {
            category: CATEGORIES[(batch + i) % CATEGORIES.len()].to_string(),
            question_type: "multiple".to_string(),
            difficulty: Difficulty::Medium,
            question: format!("B{batch} Q{i} &amp; co"),
            correct_answer: "&quot;Yes&quot;".to_string(),
            incorrect_answers: vec!["No".into(), "Don&#039;t know".into(), "Maybe".into()],
        })
        .collect()
}
