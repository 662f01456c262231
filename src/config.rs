//! Configuration types for trivia-fetch

use crate::error::{Error, Result};
use crate::types::{Difficulty, QuestionType};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest `amount` the question source accepts in one request
pub const SOURCE_MAX_PER_REQUEST: u32 = 50;

/// Question source endpoint settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Endpoint URL (default: "https://opentdb.com/api.php")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request deadline (default: 30 seconds, None = wait indefinitely)
    #[serde(default = "default_request_timeout", with = "optional_duration_serde")]
    pub request_timeout: Option<Duration>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Pagination and pacing of the request sequence
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Records requested per call (default: 50, never above the source limit)
    #[serde(default = "default_max_per_request")]
    pub max_per_request: u32,

    /// Pause between consecutive requests (default: 5000 ms)
    ///
    /// The source rejects requests issued too frequently from one client.
    #[serde(default = "default_request_delay", with = "duration_serde")]
    pub request_delay: Duration,
}

impl BatchConfig {
    /// Reject batch sizes the source cannot serve
    pub fn validate(&self) -> Result<()> {
        if self.max_per_request == 0 {
            return Err(Error::Config {
                message: "max_per_request must be at least 1".to_string(),
                key: Some("batching.max_per_request".to_string()),
            });
        }
        if self.max_per_request > SOURCE_MAX_PER_REQUEST {
            return Err(Error::Config {
                message: format!(
                    "max_per_request {} exceeds the source limit of {}",
                    self.max_per_request, SOURCE_MAX_PER_REQUEST
                ),
                key: Some("batching.max_per_request".to_string()),
            });
        }
        Ok(())
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_per_request: default_max_per_request(),
            request_delay: default_request_delay(),
        }
    }
}

/// Optional narrowing parameters forwarded to the source
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilters {
    /// Numeric source category id
    #[serde(default)]
    pub category: Option<u32>,

    /// Only questions of this difficulty
    #[serde(default)]
    pub difficulty: Option<Difficulty>,

    /// Only questions of this answer format
    #[serde(default)]
    pub question_type: Option<QuestionType>,
}

impl QueryFilters {
    /// Query pairs for the filters that are set
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(category) = self.category {
            pairs.push(("category", category.to_string()));
        }
        if let Some(difficulty) = self.difficulty {
            pairs.push(("difficulty", difficulty.as_str().to_string()));
        }
        if let Some(question_type) = self.question_type {
            pairs.push(("type", question_type.as_str().to_string()));
        }
        pairs
    }
}

/// Session cache settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Consult and populate the session cache (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Prefix of every storage key; the total amount is appended
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            key_prefix: default_key_prefix(),
        }
    }
}

/// Main configuration for the acquisition pipeline
///
/// Every field has a sensible default, so `Config::default()` talks to the
/// public source with the pacing it requires.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Source endpoint settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Pagination and pacing
    #[serde(default)]
    pub batching: BatchConfig,

    /// Source-side filters
    #[serde(default)]
    pub filters: QueryFilters,

    /// Session cache
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    /// Check settings that would make every run fail
    pub fn validate(&self) -> Result<()> {
        self.batching.validate()?;
        if self.api.base_url.trim().is_empty() {
            return Err(Error::Config {
                message: "base_url must not be empty".to_string(),
                key: Some("api.base_url".to_string()),
            });
        }
        url::Url::parse(&self.api.base_url).map_err(|e| Error::Config {
            message: format!("invalid base_url '{}': {}", self.api.base_url, e),
            key: Some("api.base_url".to_string()),
        })?;
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://opentdb.com/api.php".to_string()
}

fn default_user_agent() -> String {
    concat!("trivia-fetch/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_request_timeout() -> Option<Duration> {
    Some(Duration::from_secs(30))
}

fn default_max_per_request() -> u32 {
    SOURCE_MAX_PER_REQUEST
}

fn default_request_delay() -> Duration {
    Duration::from_millis(5000)
}

fn default_true() -> bool {
    true
}

fn default_key_prefix() -> String {
    "triviaDataCache_".to_string()
}

// Duration serialization helper (milliseconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

// Optional Duration serialization helper (milliseconds)
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}
