// Static fallback tracks
//
// Served only when the assembly pipeline hits an internal failure.

use super::{Track, TrackTag};

const FALLBACK_TRACKS: [(i64, &str, &str, &str); 10] = [
    (3135556, "Harder, Better, Faster, Stronger", "Daft Punk", "Discovery"),
    (67238735, "Get Lucky", "Daft Punk", "Random Access Memories"),
    (916424, "Billie Jean", "Michael Jackson", "Thriller"),
    (3129775, "Bohemian Rhapsody", "Queen", "A Night at the Opera"),
    (1109731, "Lose Yourself", "Eminem", "8 Mile"),
    (13791930, "Smells Like Teen Spirit", "Nirvana", "Nevermind"),
    (92720102, "Uptown Funk", "Mark Ronson", "Uptown Special"),
    (142986206, "Shape of You", "Ed Sheeran", "÷"),
    (908604612, "Blinding Lights", "The Weeknd", "After Hours"),
    (3157972, "Hotel California", "Eagles", "Hotel California"),
];

/// The fixed list of well-known tracks, tagged popular
pub fn fallback_tracks() -> Vec<Track> {
    FALLBACK_TRACKS
        .iter()
        .map(|&(id, title, artist, album)| Track {
            id,
            title: title.to_string(),
            artist: artist.to_string(),
            album: Some(album.to_string()),
            preview_url: None,
            tag: TrackTag::Popular,
        })
        .collect()
}
