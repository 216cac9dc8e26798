use super::{LemmaFuture, Lemmatizer, LemmatizerError, parse_lemmas};

use serde::Serialize;
use std::time::Duration;

const DEFAULT_ATTEMPTS: usize = 3;

#[derive(Debug, Serialize)]
struct LemmatizeRequest<'a> {
    text: &'a str,
}

/// Calls a lemmatization service: `POST {url}` with `{"text": "<words>"}`,
/// answered by a JSON array of lemmas.
pub struct HttpLemmatizer {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
    attempts: usize,
}

impl HttpLemmatizer {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            timeout,
            attempts: DEFAULT_ATTEMPTS,
        }
    }

    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    // Only transport errors are retried; an answer with a bad status is final.
    async fn post_with_retry(&self, text: &str) -> Result<reqwest::Response, LemmatizerError> {
        let payload = LemmatizeRequest { text };
        let mut delay_ms = 150u64;

        for attempt in 0..self.attempts {
            let response = self
                .client
                .post(&self.url)
                .json(&payload)
                .timeout(self.timeout)
                .send()
                .await;

            match response {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    if attempt + 1 == self.attempts {
                        if e.is_timeout() {
                            return Err(LemmatizerError::Timeout(self.timeout));
                        }
                        return Err(LemmatizerError::Http(e));
                    }
                    tracing::debug!("Lemmatizer attempt {} failed: {}", attempt + 1, e);
                    let jitter = rand::random::<u64>() % 50;
                    tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                    delay_ms = (delay_ms * 2).min(1200);
                }
            }
        }

        Err(LemmatizerError::InvalidOutput(
            "retry attempts exhausted".to_string(),
        ))
    }

    async fn run(&self, words: &[String]) -> Result<Vec<String>, LemmatizerError> {
        let response = self.post_with_retry(&words.join(" ")).await?;

        if !response.status().is_success() {
            return Err(LemmatizerError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        parse_lemmas(&body)
    }
}

impl Lemmatizer for HttpLemmatizer {
    fn name(&self) -> &'static str {
        "http"
    }

    fn lemmatize<'a>(&'a self, words: &'a [String]) -> LemmaFuture<'a> {
        Box::pin(self.run(words))
    }
}
