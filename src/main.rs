mod db;
mod extract;
mod pipeline;
mod spotify;
mod validate;

use chrono::Local;

use db::Store;
use pipeline::{EtlError, Pipeline};
use spotify::SpotifyFetcher;

struct Config {
    pub token: String,
    pub user_id: String,
    pub database_url: String,
}

impl Config {
    fn from_env() -> Self {
        dotenv::dotenv().ok();
        Config {
            token: dotenv::var("SPOTIFY_TOKEN").expect("SPOTIFY_TOKEN must be set"),
            user_id: dotenv::var("SPOTIFY_USER_ID").expect("SPOTIFY_USER_ID must be set"),
            database_url: dotenv::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://played_tracks.sqlite".to_string()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), EtlError> {
    let config = Config::from_env();
    println!(
        "Starting recently-played ETL for user {} into {}",
        config.user_id, config.database_url
    );

    let store = Store::connect(&config.database_url).await?;
    println!("Opened database successfully");

    let fetcher = SpotifyFetcher::new(config.token);
    let outcome = Pipeline::new(fetcher, store).run(Local::now()).await?;
    println!("Run finished: {:?}", outcome);

    Ok(())
}
