use chrono::DateTime;

use crate::spotify::RecentlyPlayed;

/// One raw row of the in-memory table, before validation. Cells stay
/// optional here so the validator can report absent values instead of
/// the extractor silently dropping rows.
#[derive(Debug, Clone, Default)]
pub struct PlayRow {
    pub song_name: Option<String>,
    pub artist_name: Option<String>,
    pub played_at_time: Option<String>,
    pub time_stamp: Option<String>,
}

/// Flatten the API payload into the four-column row form, one row per
/// item, preserving the API's ordering. An empty item list yields an
/// empty table, which is an expected outcome, not an error.
pub fn flatten(payload: &RecentlyPlayed) -> Vec<PlayRow> {
    payload
        .items
        .iter()
        .map(|item| {
            let track = item.track.as_ref();
            PlayRow {
                song_name: track.and_then(|t| t.name.clone()),
                artist_name: track
                    .and_then(|t| t.artists.first())
                    .and_then(|a| a.name.clone()),
                played_at_time: item.played_at.clone(),
                time_stamp: item.played_at.as_deref().and_then(day_of),
            }
        })
        .collect()
}

// Day-granularity truncation of the play timestamp. An unparsable
// timestamp leaves the cell empty for the completeness check to catch.
fn day_of(played_at: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(played_at)
        .ok()
        .map(|t| t.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod test {
    use super::flatten;
    use crate::spotify::RecentlyPlayed;

    fn payload(json: &str) -> RecentlyPlayed {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn flattens_items_in_api_order() {
        let payload = payload(
            r#"{"items": [
                {"track": {"name": "A", "artists": [{"name": "X"}]},
                 "played_at": "2024-03-14T10:00:00Z"},
                {"track": {"name": "B", "artists": [{"name": "Y"}]},
                 "played_at": "2024-03-14T18:30:00Z"}
            ]}"#,
        );

        let rows = flatten(&payload);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].song_name.as_deref(), Some("A"));
        assert_eq!(rows[0].artist_name.as_deref(), Some("X"));
        assert_eq!(rows[0].played_at_time.as_deref(), Some("2024-03-14T10:00:00Z"));
        assert_eq!(rows[0].time_stamp.as_deref(), Some("2024-03-14"));
        assert_eq!(rows[1].song_name.as_deref(), Some("B"));
        assert_eq!(rows[1].time_stamp.as_deref(), Some("2024-03-14"));
    }

    #[test]
    fn empty_item_list_yields_empty_table() {
        let rows = flatten(&payload(r#"{"items": []}"#));
        assert!(rows.is_empty());
    }

    #[test]
    fn first_artist_is_taken_as_primary() {
        let payload = payload(
            r#"{"items": [
                {"track": {"name": "A",
                           "artists": [{"name": "X"}, {"name": "Feat"}]},
                 "played_at": "2024-03-14T10:00:00Z"}
            ]}"#,
        );
        assert_eq!(flatten(&payload)[0].artist_name.as_deref(), Some("X"));
    }

    #[test]
    fn absent_fields_stay_absent_in_the_row() {
        let payload = payload(
            r#"{"items": [
                {"track": {"artists": []}, "played_at": "not-a-timestamp"}
            ]}"#,
        );

        let rows = flatten(&payload);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].song_name.is_none());
        assert!(rows[0].artist_name.is_none());
        assert_eq!(rows[0].played_at_time.as_deref(), Some("not-a-timestamp"));
        assert!(rows[0].time_stamp.is_none());
    }
}
