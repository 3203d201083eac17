// Unit tests for review text normalization.
//
// Tests the normalizer's output invariants over a spread of messy inputs:
// idempotence, character set, spacing, and the documented example.

use reviewlens::text::normalize::TextNormalizer;

const SAMPLES: &[&str] = &[
    "The UKULELE app is <b>great</b>! Visit http://example.com",
    "",
    "1234!!!",
    "   leading and trailing   ",
    "Tabs\tand\nnewlines\r\nmixed",
    "ÉCOLE de musique — très bien 🎸",
    "<div class=\"x\">nested <i>tags</i></div> after",
    "broken <tag never closes",
    "urls www.yousician.com and https://a.b/c?d=e mid-text",
    "snake_case and kebab-case and CamelCase",
    "don't won't can't",
    "aaa   bbb\u{00a0}ccc",
];

// ============================================================
// Output invariants
// ============================================================

#[test]
fn normalization_is_idempotent() {
    let normalizer = TextNormalizer::new();
    for sample in SAMPLES {
        let once = normalizer.normalize(sample);
        let twice = normalizer.normalize(&once.join(" "));
        assert_eq!(once, twice, "Re-normalizing changed the tokens of {sample:?}");
    }
}

#[test]
fn cleaned_text_is_lowercase_letters_and_single_spaces() {
    let normalizer = TextNormalizer::new();
    for sample in SAMPLES {
        let cleaned = normalizer.clean_text(sample);
        assert!(
            cleaned.chars().all(|c| c.is_ascii_lowercase() || c == ' '),
            "Unexpected character in {cleaned:?}"
        );
        assert!(!cleaned.contains("  "), "Double space in {cleaned:?}");
        assert_eq!(cleaned, cleaned.trim(), "Edge whitespace in {cleaned:?}");
    }
}

#[test]
fn tokens_are_never_empty_strings() {
    let normalizer = TextNormalizer::new();
    for sample in SAMPLES {
        assert!(normalizer.normalize(sample).iter().all(|t| !t.is_empty()));
    }
}

#[test]
fn tokens_match_cleaned_text() {
    let normalizer = TextNormalizer::new();
    for sample in SAMPLES {
        assert_eq!(normalizer.normalize(sample).join(" "), normalizer.clean_text(sample));
    }
}

// ============================================================
// Specific transformations
// ============================================================

#[test]
fn documented_example() {
    let normalizer = TextNormalizer::new();
    assert_eq!(
        normalizer.normalize("The UKULELE app is <b>great</b>! Visit http://example.com"),
        vec!["the", "ukulele", "app", "is", "great", "visit"]
    );
}

#[test]
fn unclosed_tag_is_kept_as_text() {
    let normalizer = TextNormalizer::new();
    assert_eq!(
        normalizer.normalize("broken <tag never closes"),
        vec!["broken", "tag", "never", "closes"]
    );
}

#[test]
fn tags_removed_shortest_match() {
    let normalizer = TextNormalizer::new();
    assert_eq!(
        normalizer.normalize("<div class=\"x\">nested <i>tags</i></div> after"),
        vec!["nested", "tags", "after"]
    );
}

#[test]
fn accented_letters_split_words() {
    let normalizer = TextNormalizer::new();
    assert_eq!(
        normalizer.normalize("très bien"),
        vec!["tr", "s", "bien"]
    );
}

#[test]
fn apostrophes_split_contractions() {
    let normalizer = TextNormalizer::new();
    assert_eq!(
        normalizer.normalize("don't stop"),
        vec!["don", "t", "stop"]
    );
}

#[test]
fn only_urls_gives_no_tokens() {
    let normalizer = TextNormalizer::new();
    assert!(normalizer
        .normalize("https://yousician.com www.example.org")
        .is_empty());
}
