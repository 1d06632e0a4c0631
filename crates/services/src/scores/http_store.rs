use std::env;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use tracing::debug;

use exam_core::model::ScoreRecord;
use storage::repository::{ScoreRepository, StorageError};

use crate::error::HttpStoreConfigError;

/// Environment variable holding the score store base URL.
pub const SCORES_URL_ENV: &str = "EXAM_SCORES_URL";

#[derive(Clone, Debug)]
pub struct ScoreStoreConfig {
    base_url: Url,
}

impl ScoreStoreConfig {
    /// # Errors
    ///
    /// Returns `HttpStoreConfigError` if `base_url` is empty, unparsable, or not
    /// an http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, HttpStoreConfigError> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(HttpStoreConfigError::Empty);
        }
        let parsed = Url::parse(trimmed).map_err(|e| HttpStoreConfigError::InvalidUrl {
            url: trimmed.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(HttpStoreConfigError::UnsupportedScheme(
                parsed.scheme().to_string(),
            ));
        }
        Ok(Self { base_url: parsed })
    }

    /// Reads `EXAM_SCORES_URL`; `Ok(None)` when unset or blank.
    ///
    /// # Errors
    ///
    /// Returns `HttpStoreConfigError` if the variable is set to an invalid URL.
    pub fn from_env() -> Result<Option<Self>, HttpStoreConfigError> {
        match env::var(SCORES_URL_ENV) {
            Ok(raw) if !raw.trim().is_empty() => Self::new(&raw).map(Some),
            _ => Ok(None),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn scores_endpoint(&self) -> String {
        format!("{}/api/scores", self.base_url.as_str().trim_end_matches('/'))
    }
}

/// Score history kept by a remote score API.
///
/// Task filtering is done client-side over the full list.
#[derive(Clone)]
pub struct HttpScoreStore {
    client: Client,
    endpoint: String,
}

impl HttpScoreStore {
    #[must_use]
    pub fn new(config: &ScoreStoreConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.scores_endpoint(),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn transport(err: reqwest::Error) -> StorageError {
    StorageError::Connection(err.to_string())
}

fn ensure_success(response: Response) -> Result<Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(StorageError::Connection(format!(
            "score store request failed with status {status}"
        )))
    }
}

#[async_trait]
impl ScoreRepository for HttpScoreStore {
    async fn append_score(&self, record: &ScoreRecord) -> Result<(), StorageError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(record)
            .send()
            .await
            .map_err(transport)?;
        ensure_success(response)?;
        debug!(task = %record.task_id(), "score posted");
        Ok(())
    }

    async fn list_scores(&self) -> Result<Vec<ScoreRecord>, StorageError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(transport)?;
        ensure_success(response)?
            .json::<Vec<ScoreRecord>>()
            .await
            .map_err(|e| {
                if e.is_decode() {
                    StorageError::Serialization(e.to_string())
                } else {
                    transport(e)
                }
            })
    }

    async fn clear_scores(&self) -> Result<(), StorageError> {
        let response = self
            .client
            .delete(&self.endpoint)
            .send()
            .await
            .map_err(transport)?;
        ensure_success(response)?;
        debug!("score store cleared");
        Ok(())
    }
}
