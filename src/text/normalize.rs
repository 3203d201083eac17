// Review text normalization.
//
// Every review goes through the same fixed chain before vocabulary lookup:
// lowercase, strip HTML tags, strip URLs, drop everything that isn't an ASCII
// letter, collapse whitespace. The chain must match the one the model's
// vocabulary was built with, otherwise tokens silently fall out of vocabulary.

use regex_lite::Regex;

/// A URL runs until any Unicode whitespace. regex-lite's `\s` is ASCII-only.
const URL_BODY: &str = r"[^\t\n\x0B\x0C\r\x1C-\x1F \x{85}\x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}]+";

/// Compiled normalization patterns.
///
/// Build once and reuse; the inference context owns one for its lifetime.
pub struct TextNormalizer {
    html_tag: Regex,
    url: Regex,
    non_alpha: Regex,
    whitespace: Regex,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self {
            // Shortest match, so "<b>great</b>" keeps "great"
            html_tag: Regex::new(r"<.*?>").expect("valid pattern"),
            url: Regex::new(&format!("http{URL_BODY}|www\\.{URL_BODY}")).expect("valid pattern"),
            non_alpha: Regex::new(r"[^a-z\s]").expect("valid pattern"),
            whitespace: Regex::new(r"\s+").expect("valid pattern"),
        }
    }

    /// Produce the canonical cleaned form of a review: lowercase ASCII
    /// letters separated by single spaces, no leading or trailing space.
    pub fn clean_text(&self, raw: &str) -> String {
        let text = raw.to_lowercase();
        let text = self.html_tag.replace_all(&text, " ");
        let text = self.url.replace_all(&text, " ");
        let text = self.non_alpha.replace_all(&text, " ");
        let text = self.whitespace.replace_all(&text, " ");
        text.trim().to_string()
    }

    /// Normalize a review into its token sequence.
    ///
    /// Empty or entirely non-alphabetic input yields an empty vector.
    pub fn normalize(&self, raw: &str) -> Vec<String> {
        self.clean_text(raw)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tags_urls_and_punctuation() {
        let normalizer = TextNormalizer::new();
        let tokens =
            normalizer.normalize("The UKULELE app is <b>great</b>! Visit http://example.com");
        assert_eq!(tokens, vec!["the", "ukulele", "app", "is", "great", "visit"]);
    }

    #[test]
    fn test_www_urls_removed() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.normalize("see www.yousician.com/ukulele for more"),
            vec!["see", "for", "more"]
        );
    }

    #[test]
    fn test_url_stops_at_unicode_space() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.normalize("see http://x.com\u{00a0}great chords"),
            vec!["see", "great", "chords"]
        );
        assert_eq!(
            normalizer.normalize("see www.x.com\u{3000}great chords"),
            vec!["see", "great", "chords"]
        );
        assert_eq!(
            normalizer.normalize("see http://x.com\u{2003}great\u{1f}chords"),
            vec!["see", "great", "chords"]
        );
    }

    #[test]
    fn test_bare_http_word_kept() {
        // "http" with nothing attached isn't a URL
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("http is a protocol"), vec!["http", "is", "a", "protocol"]);
    }

    #[test]
    fn test_digits_split_words() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("level2beginner"), vec!["level", "beginner"]);
    }

    #[test]
    fn test_garbage_input_is_empty() {
        let normalizer = TextNormalizer::new();
        assert!(normalizer.normalize("").is_empty());
        assert!(normalizer.normalize("1234!!!").is_empty());
        assert!(normalizer.normalize("   \t\n ").is_empty());
        assert_eq!(normalizer.clean_text("<p></p> 42"), "");
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.clean_text("  Love\tthe\n\nchord   charts!! "),
            "love the chord charts"
        );
    }
}
