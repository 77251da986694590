// Intent extraction from free-text requests
//
// Static keyword matching against three fixed vocabularies. The first
// (leftmost) occurrence in the text wins for each category.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static GENRE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(rock|pop|funk|jazz|rap|hip[- ]?hop|electro|classique|metal|chill|lofi|rnb|blues|country|reggae|soul|folk|disco|techno|house|trap|punk|indie)",
    )
    .expect("genre pattern is valid")
});

static MOOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(joyeux|triste|motivant|calme|nostalgique|énergique|romantique|festif|détente|mélancolique|positif|dark|cool|ambiance|été|hiver|printemps|automne)",
    )
    .expect("mood pattern is valid")
});

static STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(playlist|mix|compilation|sélection|best of|top|hits|essentiels)")
        .expect("style pattern is valid")
});

/// Structured intent extracted from a user request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub genre: Option<String>,
    pub mood: Option<String>,
    pub style: Option<String>,
}

impl Intent {
    pub fn is_empty(&self) -> bool {
        self.genre.is_none() && self.mood.is_none() && self.style.is_none()
    }
}

/// Parse genre, mood and style out of `text`.
///
/// Matched words are returned as they appear in the text (original casing).
pub fn parse(text: &str) -> Intent {
    if text.trim().is_empty() {
        return Intent::default();
    }

    Intent {
        genre: first_match(&GENRE_RE, text),
        mood: first_match(&MOOD_RE, text),
        style: first_match(&STYLE_RE, text),
    }
}

fn first_match(re: &Regex, text: &str) -> Option<String> {
    re.find(text).map(|m| m.as_str().to_string())
}
