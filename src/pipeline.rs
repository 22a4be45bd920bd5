use chrono::{DateTime, Days, Local};
use thiserror::Error;

use crate::db::{LoadOutcome, Store};
use crate::extract;
use crate::spotify::{RecentlyPlayedClient, SpotifyError};
use crate::validate::{check_batch, Checked, ValidationError};

#[derive(Debug, Error)]
pub enum EtlError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] SpotifyError),
    #[error("invalid batch: {0}")]
    Validation(#[from] ValidationError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing was played in the window; storage was not touched.
    NoData,
    Loaded(usize),
    AlreadyLoaded,
}

/// The whole job: one fetch, one validation pass, one load. Generic over
/// the client so tests can drive it with canned payloads.
pub struct Pipeline<C> {
    client: C,
    store: Store,
}

impl<C: RecentlyPlayedClient> Pipeline<C> {
    pub fn new(client: C, store: Store) -> Self {
        Pipeline { client, store }
    }

    /// Run the pipeline once. `now` fixes both the fetch window (plays
    /// after `now - 1 day`) and the recency day the validator checks
    /// against. The storage connection is closed on every exit path.
    pub async fn run(self, now: DateTime<Local>) -> Result<RunOutcome, EtlError> {
        let outcome = self.execute(now).await;
        self.store.close().await;
        println!("Connection closed successfully");
        outcome
    }

    async fn execute(&self, now: DateTime<Local>) -> Result<RunOutcome, EtlError> {
        let yesterday = now - Days::new(1);
        let payload = self
            .client
            .recently_played_after(yesterday.timestamp_millis())
            .await?;

        let rows = extract::flatten(&payload);
        println!("Fetched {} plays from the API", rows.len());

        let batch = match check_batch(&rows, now.date_naive())? {
            Checked::Empty => {
                println!("No songs found and downloaded. Finishing execution");
                return Ok(RunOutcome::NoData);
            }
            Checked::Valid(batch) => batch,
        };
        println!("All data is valid, proceeding to load stage");

        match self.store.append(&batch).await? {
            LoadOutcome::Inserted(count) => {
                println!("Loaded {} plays into played_tracks", count);
                Ok(RunOutcome::Loaded(count))
            }
            LoadOutcome::AlreadyLoaded => {
                println!("Data already exists in the database");
                Ok(RunOutcome::AlreadyLoaded)
            }
        }
    }
}
