//! REST document store client
//!
//! Generalized CRUD over opaque game documents, keyed by a
//! server-assigned id. The endpoint layout is
//! `base/db/collection[/id]`; no id on a GET lists the collection.
//! Bodies are exactly the storage documents of
//! [`chesslogger_core::wire`]; this crate never looks inside them.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use chesslogger_core::GameDocument;

/// Errors talking to the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not reach the store: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store rejected the request with status {code}")]
    Status { code: u16 },

    #[error("store base url is invalid: {0}")]
    BadUrl(#[from] url::ParseError),

    #[error("store base url cannot carry path segments")]
    BadBase,
}

/// A persisted game as the store returns it: the document plus its id
#[derive(Debug, Clone, Deserialize)]
pub struct StoredGame {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub game: GameDocument,
}

#[derive(Debug, Deserialize)]
struct SavedId {
    #[serde(rename = "_id")]
    id: String,
}

/// Client for one database/collection pair
#[derive(Debug, Clone)]
pub struct GameStore {
    base: Url,
    db: String,
    collection: String,
    client: Client,
}

impl GameStore {
    /// Remember connection defaults for subsequent requests
    pub fn new(
        base: &str,
        db: impl Into<String>,
        collection: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let base = Url::parse(base)?;
        if base.cannot_be_a_base() {
            return Err(StoreError::BadBase);
        }
        Ok(GameStore {
            base,
            db: db.into(),
            collection: collection.into(),
            client: Client::new(),
        })
    }

    /// Fully qualified uri for one REST call; no id addresses the
    /// whole collection
    fn url_for(&self, id: Option<&str>) -> Url {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().expect("base validated in new");
            segments
                .pop_if_empty()
                .push(&self.db)
                .push(&self.collection);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    /// List every saved game in the collection
    pub async fn list(&self) -> Result<Vec<StoredGame>, StoreError> {
        let url = self.url_for(None);
        debug!("[STORE] GET {url}");
        let response = self.client.get(url).send().await?;
        Self::check(response.status())?;
        Ok(response.json().await?)
    }

    /// Fetch one saved game by id
    pub async fn fetch(&self, id: &str) -> Result<StoredGame, StoreError> {
        let url = self.url_for(Some(id));
        debug!("[STORE] GET {url}");
        let response = self.client.get(url).send().await?;
        Self::check(response.status())?;
        Ok(response.json().await?)
    }

    /// Save a new game; the store assigns and returns its id
    pub async fn create(&self, doc: &GameDocument) -> Result<String, StoreError> {
        let url = self.url_for(None);
        debug!("[STORE] POST {url}");
        let response = self.client.post(url).json(doc).send().await?;
        Self::check(response.status())?;
        let saved: SavedId = response.json().await?;
        Ok(saved.id)
    }

    /// Overwrite a saved game in place
    pub async fn update(&self, id: &str, doc: &GameDocument) -> Result<(), StoreError> {
        let url = self.url_for(Some(id));
        debug!("[STORE] PUT {url}");
        let response = self.client.put(url).json(doc).send().await?;
        Self::check(response.status())
    }

    /// Delete a saved game
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let url = self.url_for(Some(id));
        debug!("[STORE] DELETE {url}");
        let response = self.client.delete(url).send().await?;
        Self::check(response.status())
    }

    fn check(status: StatusCode) -> Result<(), StoreError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(StoreError::Status {
                code: status.as_u16(),
            })
        }
    }
}
