use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// One validated play, ready for storage. All cells are present by
/// construction; only the validator produces these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayRecord {
    pub song_name: String,
    pub artist_name: String,
    pub played_at_time: String,
    pub time_stamp: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Inserted(usize),
    /// The batch collided with rows loaded by a previous run. Nothing
    /// was written; the run still counts as a success.
    AlreadyLoaded,
}

const CREATE_PLAYED_TRACKS: &str = "\
    CREATE TABLE IF NOT EXISTS played_tracks(
        song_name VARCHAR(200),
        artist_name VARCHAR(200),
        played_at_time VARCHAR(200),
        time_stamp VARCHAR(200),
        CONSTRAINT primary_key_constraint PRIMARY KEY (played_at_time)
    )";

const INSERT_PLAY: &str = "\
    INSERT INTO played_tracks (song_name, artist_name, played_at_time, time_stamp)
    VALUES (?1, ?2, ?3, ?4)";

pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open the database at `url` (e.g. `sqlite://played_tracks.sqlite`),
    /// creating the file and the destination table on first run. Exactly
    /// one run touches the store at a time, so the pool is capped at a
    /// single connection.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(CREATE_PLAYED_TRACKS).execute(&pool).await?;

        Ok(Store { pool })
    }

    /// Append the whole batch inside one transaction. A unique-constraint
    /// violation on any row rolls everything back and reports the batch
    /// as already loaded; no partial insert survives.
    pub async fn append(
        &self,
        batch: &[PlayRecord],
    ) -> Result<LoadOutcome, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        for record in batch {
            let inserted = sqlx::query(INSERT_PLAY)
                .bind(&record.song_name)
                .bind(&record.artist_name)
                .bind(&record.played_at_time)
                .bind(&record.time_stamp)
                .execute(&mut *tx)
                .await;

            match inserted {
                Ok(_) => {}
                Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                    tx.rollback().await?;
                    return Ok(LoadOutcome::AlreadyLoaded);
                }
                Err(e) => return Err(e),
            }
        }

        tx.commit().await?;
        Ok(LoadOutcome::Inserted(batch.len()))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
