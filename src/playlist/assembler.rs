// Playlist assembly
//
// Fan out intent into catalog queries, fetch them one after another, keep
// the first copy of every track id, top up short results with a backfill
// search, then shuffle and truncate. Internal failures (a catalog fault or
// a panic anywhere in the pipeline) degrade to the static fallback list.
// A catalog that simply finds nothing yields an empty playlist.

use super::fallback::fallback_tracks;
use super::queries::{build_queries, per_query_limit, tag_for_query, BACKFILL_QUERY};
use super::{Track, TrackTag};
use crate::catalog::{CatalogSearch, CatalogTrack};
use crate::error::CatalogError;
use futures::FutureExt;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info};

pub struct PlaylistAssembler {
    catalog: Arc<dyn CatalogSearch>,
}

impl PlaylistAssembler {
    pub fn new(catalog: Arc<dyn CatalogSearch>) -> Self {
        Self { catalog }
    }

    /// Build a playlist of at most `count` unique tracks.
    ///
    /// Never fails: internal errors are logged and replaced by the static
    /// fallback list, shuffled and truncated to `count`.
    pub async fn assemble(
        &self,
        genre: Option<&str>,
        mood: Option<&str>,
        count: usize,
        context: &str,
    ) -> Vec<Track> {
        if count == 0 {
            return Vec::new();
        }

        let outcome = AssertUnwindSafe(self.try_assemble(genre, mood, count, context))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(tracks)) => {
                info!(requested = count, returned = tracks.len(), "Playlist assembled");
                tracks
            }
            Ok(Err(e)) => {
                error!(error = %e, "Playlist assembly failed, serving fallback tracks");
                shuffle_and_truncate(fallback_tracks(), count)
            }
            Err(_) => {
                error!("Playlist assembly panicked, serving fallback tracks");
                shuffle_and_truncate(fallback_tracks(), count)
            }
        }
    }

    async fn try_assemble(
        &self,
        genre: Option<&str>,
        mood: Option<&str>,
        count: usize,
        context: &str,
    ) -> Result<Vec<Track>, CatalogError> {
        let queries = build_queries(genre, mood, context);
        let per_query = per_query_limit(count, queries.len());
        debug!(queries = ?queries, per_query, "Searching catalog");

        let mut seen: HashSet<i64> = HashSet::new();
        let mut tracks: Vec<Track> = Vec::new();

        // Sequential on purpose: earlier queries own the tag of shared tracks.
        for query in &queries {
            let found = self.catalog.search(query, per_query).await?;
            merge_unique(&mut tracks, &mut seen, found, tag_for_query(query));
        }

        if tracks.len() < count {
            let missing = count - tracks.len();
            debug!(have = tracks.len(), missing, "Backfilling playlist");
            let found = self.catalog.search(BACKFILL_QUERY, missing).await?;
            merge_unique(&mut tracks, &mut seen, found, TrackTag::Popular);
        }

        Ok(shuffle_and_truncate(tracks, count))
    }
}

fn merge_unique(
    tracks: &mut Vec<Track>,
    seen: &mut HashSet<i64>,
    found: Vec<CatalogTrack>,
    tag: TrackTag,
) {
    for track in found {
        if seen.insert(track.id) {
            tracks.push(Track::from_catalog(track, tag));
        }
    }
}

/// Fisher-Yates shuffle, then keep the first `count` tracks
fn shuffle_and_truncate(mut tracks: Vec<Track>, count: usize) -> Vec<Track> {
    tracks.shuffle(&mut rand::thread_rng());
    tracks.truncate(count);
    tracks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogAlbum, CatalogArtist};
    use crate::playlist::queries::TRENDING_QUERIES;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn catalog_track(id: i64) -> CatalogTrack {
        CatalogTrack {
            id,
            title: format!("Track {}", id),
            artist: CatalogArtist {
                name: format!("Artist {}", id),
            },
            album: Some(CatalogAlbum {
                title: format!("Album {}", id),
            }),
            preview: Some(format!("https://preview.example/{}.mp3", id)),
            duration: Some(180),
        }
    }

    /// Returns fixed per-query results and records every call
    #[derive(Default)]
    struct ScriptedCatalog {
        responses: HashMap<String, Vec<i64>>,
        calls: Mutex<Vec<(String, usize)>>,
    }

    impl ScriptedCatalog {
        fn with(mut self, query: &str, ids: &[i64]) -> Self {
            self.responses.insert(query.to_string(), ids.to_vec());
            self
        }

        fn calls(&self) -> Vec<(String, usize)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CatalogSearch for ScriptedCatalog {
        async fn search(&self, query: &str, limit: usize) -> Result<Vec<CatalogTrack>, CatalogError> {
            self.calls.lock().unwrap().push((query.to_string(), limit));
            Ok(self
                .responses
                .get(query)
                .map(|ids| ids.iter().copied().map(catalog_track).collect())
                .unwrap_or_default())
        }
    }

    /// Same tracks for every query
    struct RepeatingCatalog(Vec<i64>);

    #[async_trait]
    impl CatalogSearch for RepeatingCatalog {
        async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<CatalogTrack>, CatalogError> {
            Ok(self.0.iter().copied().map(catalog_track).collect())
        }
    }

    struct FaultyCatalog;

    #[async_trait]
    impl CatalogSearch for FaultyCatalog {
        async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<CatalogTrack>, CatalogError> {
            Err(CatalogError::Internal("injected fault".to_string()))
        }
    }

    struct PanickingCatalog;

    #[async_trait]
    impl CatalogSearch for PanickingCatalog {
        async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<CatalogTrack>, CatalogError> {
            panic!("injected panic");
        }
    }

    fn assert_unique(tracks: &[Track]) {
        let ids: HashSet<i64> = tracks.iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), tracks.len(), "duplicate track ids in {:?}", tracks);
    }

    fn fallback_ids() -> HashSet<i64> {
        fallback_tracks().iter().map(|t| t.id).collect()
    }

    #[tokio::test]
    async fn test_zero_count_makes_no_calls() {
        let catalog = Arc::new(ScriptedCatalog::default());
        let assembler = PlaylistAssembler::new(catalog.clone());

        let tracks = assembler.assemble(Some("rock"), None, 0, "").await;

        assert!(tracks.is_empty());
        assert!(catalog.calls().is_empty());
    }

    #[tokio::test]
    async fn test_queries_are_sequential_and_ordered() {
        let catalog = Arc::new(ScriptedCatalog::default());
        let assembler = PlaylistAssembler::new(catalog.clone());

        assembler.assemble(Some("rock"), Some("calme"), 10, "").await;

        let calls = catalog.calls();
        let queries: Vec<&str> = calls.iter().map(|(q, _)| q.as_str()).collect();
        assert_eq!(
            queries,
            vec![
                "rock calme",
                "rock classics",
                "rock anthems",
                "alternative rock",
                "chill vibes",
                "ambient relax",
                BACKFILL_QUERY,
            ]
        );
        // ceil(10 / 6) = 2 per query; nothing found, so the backfill asks for all 10
        assert!(calls[..6].iter().all(|(_, limit)| *limit == 2));
        assert_eq!(calls[6].1, 10);
    }

    #[tokio::test]
    async fn test_duplicates_keep_first_tag() {
        // "jazz classics" is a search query, "top hits 2024" a popular one;
        // track 1 comes back from both.
        let catalog = Arc::new(
            ScriptedCatalog::default()
                .with("jazz classics", &[1, 2])
                .with("top hits 2024", &[1, 3]),
        );
        let assembler = PlaylistAssembler::new(catalog);

        let tracks = assembler.assemble(Some("jazz"), None, 3, "").await;

        assert_eq!(tracks.len(), 3);
        assert_unique(&tracks);
        let tag_of = |id: i64| tracks.iter().find(|t| t.id == id).map(|t| t.tag);
        assert_eq!(tag_of(1), Some(TrackTag::Search));
        assert_eq!(tag_of(2), Some(TrackTag::Search));
        assert_eq!(tag_of(3), Some(TrackTag::Popular));
    }

    #[tokio::test]
    async fn test_repeated_results_are_deduplicated() {
        let assembler = PlaylistAssembler::new(Arc::new(RepeatingCatalog(vec![7, 8, 9])));

        let tracks = assembler.assemble(Some("rock"), Some("calme"), 10, "").await;

        assert_eq!(tracks.len(), 3);
        assert_unique(&tracks);
    }

    #[tokio::test]
    async fn test_backfill_tops_up_short_results() {
        let catalog = Arc::new(
            ScriptedCatalog::default()
                .with("smooth jazz", &[1, 2])
                .with(BACKFILL_QUERY, &[2, 10, 11, 12, 13, 14, 15, 16]),
        );
        let assembler = PlaylistAssembler::new(catalog.clone());

        let tracks = assembler.assemble(Some("jazz"), None, 6, "").await;

        assert_eq!(tracks.len(), 6);
        assert_unique(&tracks);
        let backfill_call = catalog.calls().last().cloned().unwrap();
        assert_eq!(backfill_call, (BACKFILL_QUERY.to_string(), 4));
        for track in &tracks {
            let expected = if track.id == 1 || track.id == 2 {
                TrackTag::Search
            } else {
                TrackTag::Popular
            };
            assert_eq!(track.tag, expected, "track {}", track.id);
        }
    }

    #[tokio::test]
    async fn test_no_backfill_when_enough_tracks() {
        let mut catalog = ScriptedCatalog::default();
        for (i, query) in TRENDING_QUERIES.iter().enumerate() {
            let base = (i as i64) * 10;
            catalog = catalog.with(query, &[base, base + 1, base + 2]);
        }
        let catalog = Arc::new(catalog);
        let assembler = PlaylistAssembler::new(catalog.clone());

        let tracks = assembler.assemble(None, None, 5, "").await;

        assert_eq!(tracks.len(), 5);
        assert!(tracks.iter().all(|t| t.tag == TrackTag::Popular));
        assert!(catalog.calls().iter().all(|(q, _)| q != BACKFILL_QUERY));
    }

    #[tokio::test]
    async fn test_network_down_yields_empty_not_fallback() {
        let assembler = PlaylistAssembler::new(Arc::new(ScriptedCatalog::default()));

        let tracks = assembler.assemble(Some("funk"), Some("joyeux"), 10, "été").await;

        assert!(tracks.is_empty());
    }

    #[tokio::test]
    async fn test_faulty_catalog_yields_fallback() {
        let assembler = PlaylistAssembler::new(Arc::new(FaultyCatalog));

        let tracks = assembler.assemble(Some("rock"), None, 4, "").await;
        assert_eq!(tracks.len(), 4);
        assert!(tracks.iter().all(|t| fallback_ids().contains(&t.id)));

        let tracks = assembler.assemble(Some("rock"), None, 25, "").await;
        assert_eq!(tracks.len(), 10);
        assert_unique(&tracks);
        let ids: HashSet<i64> = tracks.iter().map(|t| t.id).collect();
        assert_eq!(ids, fallback_ids());
    }

    #[tokio::test]
    async fn test_panicking_catalog_yields_fallback() {
        let assembler = PlaylistAssembler::new(Arc::new(PanickingCatalog));

        let tracks = assembler.assemble(None, Some("calme"), 3, "").await;

        assert_eq!(tracks.len(), 3);
        assert!(tracks.iter().all(|t| fallback_ids().contains(&t.id)));
    }
}
