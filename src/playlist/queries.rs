// Search query fan-out
//
// Intent words and context triggers expand into catalog queries through
// fixed tables. The result is ordered, distinct and capped.

use super::TrackTag;

/// Upper bound on queries issued per playlist
pub const MAX_QUERIES: usize = 6;

/// Minimum number of tracks requested per query
pub const MIN_PER_QUERY: usize = 2;

/// Always appended after the intent-derived queries
pub const TRENDING_QUERIES: [&str; 3] = ["top hits 2024", "viral songs", "trending music"];

/// Query used to top up a short playlist
pub const BACKFILL_QUERY: &str = "popular hits";

const POPULAR_MARKERS: [&str; 3] = ["top", "hits", "trending"];

/// Related queries for a known genre (matched lowercase)
fn genre_queries(genre: &str) -> Option<&'static [&'static str]> {
    let queries: &'static [&'static str] = match genre {
        "funk" => &["funk classics", "funky groove", "disco funk", "funk soul"],
        "rock" => &["rock classics", "rock anthems", "alternative rock"],
        "jazz" => &["jazz classics", "smooth jazz", "jazz standards"],
        "pop" => &["pop hits", "pop anthems", "dance pop"],
        "hip-hop" | "hip hop" | "hiphop" | "rap" => {
            &["hip hop classics", "rap francais", "old school hip hop"]
        }
        "electro" | "house" | "techno" => &["electronic dance", "deep house", "techno club"],
        _ => return None,
    };
    Some(queries)
}

/// Related queries for a known mood (matched lowercase)
fn mood_queries(mood: &str) -> Option<&'static [&'static str]> {
    let queries: &'static [&'static str] = match mood {
        "joyeux" | "festif" => &["happy hits", "feel good music", "party songs"],
        "calme" | "relaxant" | "détente" => &["chill vibes", "ambient relax"],
        "énergique" | "motivant" => &["workout music", "high energy"],
        "romantique" => &["love songs"],
        "mélancolique" | "triste" => &["sad songs", "emotional ballads"],
        _ => return None,
    };
    Some(queries)
}

/// Context triggers (any substring) and the queries they add
const CONTEXT_TRIGGERS: &[(&[&str], &[&str])] = &[
    (&["summer", "été"], &["summer hits", "summer vibes"]),
    (&["winter", "hiver"], &["winter chill", "cozy acoustic"]),
    (&["sport", "gym"], &["workout motivation", "gym hits"]),
    (&["work", "office", "travail", "bureau"], &["focus music", "concentration"]),
    (&["party", "fête", "soirée"], &["party hits", "dance party"]),
    (&["weekend", "week-end", "barbecue"], &["weekend vibes", "barbecue party"]),
    (&["car", "voiture", "road trip", "road-trip"], &["road trip songs", "driving music"]),
];

/// Build the ordered, distinct, capped list of catalog queries.
pub fn build_queries(genre: Option<&str>, mood: Option<&str>, context: &str) -> Vec<String> {
    let genre = genre.map(str::trim).filter(|g| !g.is_empty());
    let mood = mood.map(str::trim).filter(|m| !m.is_empty());

    let mut candidates: Vec<String> = Vec::new();

    if let (Some(genre), Some(mood)) = (genre, mood) {
        candidates.push(format!("{} {}", genre, mood));
    }

    if let Some(genre) = genre {
        match genre_queries(&genre.to_lowercase()) {
            Some(related) => candidates.extend(related.iter().map(|q| q.to_string())),
            None => candidates.push(genre.to_string()),
        }
    }

    if let Some(mood) = mood {
        match mood_queries(&mood.to_lowercase()) {
            Some(related) => candidates.extend(related.iter().map(|q| q.to_string())),
            None => candidates.push(mood.to_string()),
        }
    }

    let context = context.to_lowercase();
    for (triggers, related) in CONTEXT_TRIGGERS {
        if triggers.iter().any(|t| context.contains(t)) {
            candidates.extend(related.iter().map(|q| q.to_string()));
        }
    }

    candidates.extend(TRENDING_QUERIES.iter().map(|q| q.to_string()));

    let mut queries: Vec<String> = Vec::with_capacity(MAX_QUERIES);
    for candidate in candidates {
        if queries.len() == MAX_QUERIES {
            break;
        }
        if !queries.contains(&candidate) {
            queries.push(candidate);
        }
    }
    queries
}

/// Tracks found through trending-style queries are tagged popular
pub fn tag_for_query(query: &str) -> TrackTag {
    let query = query.to_lowercase();
    if POPULAR_MARKERS.iter().any(|marker| query.contains(marker)) {
        TrackTag::Popular
    } else {
        TrackTag::Search
    }
}

/// Tracks requested per query: `max(2, ceil(count / queries))`
pub fn per_query_limit(count: usize, query_count: usize) -> usize {
    if query_count == 0 {
        return count.max(MIN_PER_QUERY);
    }
    count.div_ceil(query_count).max(MIN_PER_QUERY)
}
