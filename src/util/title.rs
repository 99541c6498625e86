//! Title cleansing and relevance matching.
//!
//! Publishing sites pack quality, language and size tokens into post titles
//! ("Inception 2010 1080p BluRay Hindi Dubbed"). These helpers strip that
//! noise down to a catalog-searchable title plus a 4-digit year.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref QUALITY_TOKENS: Regex = Regex::new(
        r"(?i)\b(480p|720p|1080p|2160p|4K|HDRip|BluRay|WEB-DL|WEBRip|HEVC|x264|x265|BRRip)\b"
    )
    .expect("quality token pattern");
    static ref LANGUAGE_TOKENS: Regex = Regex::new(
        r"(?i)\b(Hindi|English|Tamil|Telugu|Dual\s*Audio|Multi\s*Audio|Dubbed|ORG)\b"
    )
    .expect("language token pattern");
    static ref SIZE_TOKENS: Regex =
        Regex::new(r"(?i)\b\d+(\.\d+)?\s*(GB|MB)\b").expect("size token pattern");
    static ref YEAR: Regex = Regex::new(r"\b(19\d{2}|20\d{2})\b").expect("year pattern");
    static ref QUALITY: Regex =
        Regex::new(r"(?i)(480p|720p|1080p|2160p|4K|FHD|UHD|HD)").expect("quality pattern");
    static ref SEPARATORS: Regex = Regex::new(r"[:\-\|\[\]\(\)]+").expect("separator pattern");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("whitespace pattern");
}

/// Strip quality/language/size tokens and extract the release year.
///
/// `"Inception 2010 1080p BluRay Hindi Dubbed"` -> `("Inception", Some("2010"))`
pub fn clean_title(raw: &str) -> (String, Option<String>) {
    let mut title = QUALITY_TOKENS.replace_all(raw, "").into_owned();
    title = LANGUAGE_TOKENS.replace_all(&title, "").into_owned();
    title = SIZE_TOKENS.replace_all(&title, "").into_owned();

    let year = YEAR.find(&title).map(|m| m.as_str().to_string());
    if let Some(ref y) = year {
        title = title.replace(y, "");
    }

    title = SEPARATORS.replace_all(&title, " ").into_owned();
    title = WHITESPACE.replace_all(&title, " ").trim().to_string();

    (title, year)
}

/// Extract a quality tag from surrounding text, defaulting to "HD".
pub fn extract_quality(text: &str) -> String {
    QUALITY
        .find(text)
        .map(|m| m.as_str().to_uppercase())
        .unwrap_or_else(|| "HD".to_string())
}

/// Derive a human-facing type label (language/audio) from surrounding text.
pub fn extract_type_label(text: &str) -> String {
    let lower = text.to_lowercase();
    if lower.contains("dual audio") {
        "Dual Audio".to_string()
    } else if lower.contains("multi audio") {
        "Multi Audio".to_string()
    } else if lower.contains("hindi") || lower.contains("dubbed") {
        "Hindi Dubbed".to_string()
    } else if lower.contains("english") || lower.contains(" eng") {
        "English".to_string()
    } else {
        "Download".to_string()
    }
}

/// Words of the query that must appear in a matching title. Short tokens and
/// bare 4-digit years carry no discriminating power and are dropped.
pub fn significant_words(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .filter(|w| w.len() >= 3 && !(w.chars().all(|c| c.is_ascii_digit()) && w.len() == 4))
        .map(str::to_lowercase)
        .collect()
}

/// Relevance filter: every significant query word must appear in the title,
/// and the year (when the caller supplies one) must appear verbatim.
pub fn title_matches(title: &str, words: &[String], year: Option<&str>) -> bool {
    let lower = title.to_lowercase();
    if !words.iter().all(|w| lower.contains(w.as_str())) {
        return false;
    }
    if let Some(y) = year {
        if !title.contains(y) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleans_quality_and_language_noise() {
        let (title, year) = clean_title("Inception 2010 1080p BluRay Hindi Dubbed");
        assert_eq!(title, "Inception");
        assert_eq!(year.as_deref(), Some("2010"));
    }

    #[test]
    fn keeps_title_without_year() {
        let (title, year) = clean_title("Oppenheimer 720p WEB-DL Dual Audio");
        assert_eq!(title, "Oppenheimer");
        assert_eq!(year, None);
    }

    #[test]
    fn strips_size_markers() {
        let (title, _) = clean_title("Dune Part Two 2024 [1.4 GB] HEVC");
        assert_eq!(title, "Dune Part Two");
    }

    #[test]
    fn quality_defaults_to_hd() {
        assert_eq!(extract_quality("Inception 1080p BluRay"), "1080P");
        assert_eq!(extract_quality("no markers here"), "HD");
    }

    #[test]
    fn type_label_prefers_dual_audio() {
        assert_eq!(extract_type_label("Dual Audio Hindi 720p"), "Dual Audio");
        assert_eq!(extract_type_label("Hindi Dubbed HDRip"), "Hindi Dubbed");
        assert_eq!(extract_type_label("plain link"), "Download");
    }

    #[test]
    fn significant_words_drop_years_and_short_tokens() {
        assert_eq!(significant_words("The Dark Knight 2008"), vec!["the", "dark", "knight"]);
    }

    #[test]
    fn relevance_requires_all_words_and_year() {
        let words = significant_words("dark knight");
        assert!(title_matches("The Dark Knight 2008 1080p", &words, Some("2008")));
        assert!(!title_matches("The Dark Knight 2008", &words, Some("2012")));
        assert!(!title_matches("Knight Rider", &words, None));
    }
}
