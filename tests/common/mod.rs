//! Common test utilities for trivia-fetch integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use trivia_fetch::{Config, HttpQuestionSource, SessionStorage, TriviaService};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Inter-request delay used against the mock server
pub const TEST_DELAY: Duration = Duration::from_millis(200);

/// Config pointing at `server` with a short delay
pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.base_url = format!("{}/api.php", server.uri());
    config.api.request_timeout = Some(Duration::from_secs(5));
    config.batching.request_delay = TEST_DELAY;
    config
}

/// Service against `server` using `storage` as its session cache
pub fn service_for(server: &MockServer, storage: Arc<dyn SessionStorage>) -> TriviaService {
    let config = config_for(server);
    let source = HttpQuestionSource::new(&config.api, &config.filters)
        .expect("HTTP client should build");
    TriviaService::with_parts(Arc::new(source), storage, &config)
        .expect("test config should be valid")
}

/// Source-shaped body with `n` entity-encoded questions tagged `tag`
pub fn questions_body(tag: &str, n: usize) -> serde_json::Value {
    let categories = [
        "Entertainment: Film",
        "Science &amp; Nature",
        "Geography",
    ];
    let difficulties = ["easy", "medium", "hard"];
    let results: Vec<_> = (0..n)
        .map(|i| {
            serde_json::json!({
                "category": categories[i % categories.len()],
                "type": "multiple",
                "difficulty": difficulties[i % difficulties.len()],
                "question": format!("{tag} #{i}: Who wrote &quot;Hamlet&quot;?"),
                "correct_answer": "William Shakespeare",
                "incorrect_answers": [
                    "Christopher Marlowe",
                    "Ben Jonson",
                    "Fran&ccedil;ois Rabelais"
                ]
            })
        })
        .collect();
    serde_json::json!({ "response_code": 0, "results": results })
}

/// Mount a success response for `amount`, expected exactly `times` times
pub async fn mount_batch(server: &MockServer, amount: u32, tag: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("amount", amount.to_string()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(questions_body(tag, amount as usize)),
        )
        .expect(times)
        .mount(server)
        .await;
}

/// `amount` query values of every request received so far, in order
pub async fn requested_amounts(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|request| {
            request
                .url
                .query_pairs()
                .find(|(key, _)| key == "amount")
                .map(|(_, value)| value.into_owned())
        })
        .collect()
}
