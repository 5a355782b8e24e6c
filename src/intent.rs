/// What a mention is asking for, derived statelessly from its cleaned text.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Not a question; produce no reply.
    Ignore,
    NewsRequest {
        /// Free-text remainder after keyword stripping; `None` means top
        /// headlines with no topic filter.
        topic: Option<String>,
        wants_summary: bool,
    },
    GeneralQuery {
        question: String,
    },
}

const SUMMARY_KEYWORDS: [&str; 3] = ["summary", "summarize", "summarise"];

// Checked in order; the first keyword found is the one stripped from the
// topic. Substring matching is a known heuristic ("newspaper" matches
// "news") and is kept as-is.
const NEWS_KEYWORDS: [&str; 5] = ["news", "sports", "movies", "weather", "headlines"];

/// Remove every case-insensitive occurrence of `@handle` and trim.
pub fn clean_mention_text(text: &str, handle: &str) -> String {
    let token = format!("@{}", handle);
    strip_all_occurrences(text, &token).trim().to_string()
}

/// Classify a cleaned mention text.
///
/// Anything not ending in `?` is ignored: plain mentions, retweets and
/// acknowledgements get no reply, at an accepted false-negative cost.
pub fn classify(cleaned: &str) -> Intent {
    if !cleaned.ends_with('?') {
        return Intent::Ignore;
    }

    let lower = cleaned.to_ascii_lowercase();
    let wants_summary = SUMMARY_KEYWORDS.iter().any(|kw| lower.contains(kw));

    match NEWS_KEYWORDS.iter().find(|kw| lower.contains(*kw)) {
        Some(keyword) => {
            let topic = strip_all_occurrences(cleaned, keyword).trim().to_string();
            // A remainder of pure punctuation means "no topic filter".
            let topic = if topic.chars().any(char::is_alphanumeric) {
                Some(topic)
            } else {
                None
            };
            Intent::NewsRequest {
                topic,
                wants_summary,
            }
        }
        None => Intent::GeneralQuery {
            question: cleaned.to_string(),
        },
    }
}

/// Remove every case-insensitive occurrence of `needle`, preserving the
/// case of everything else. Needles are ASCII (handles and keywords), so
/// byte offsets into the lowercased copy line up with the original.
fn strip_all_occurrences(text: &str, needle: &str) -> String {
    if needle.is_empty() {
        return text.to_string();
    }
    let haystack = text.to_ascii_lowercase();
    let needle = needle.to_ascii_lowercase();

    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(found) = haystack[pos..].find(&needle) {
        let start = pos + found;
        out.push_str(&text[pos..start]);
        pos = start + needle.len();
    }
    out.push_str(&text[pos..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_questions_are_ignored() {
        for text in ["", "hello there", "great bot!", "thanks.", "news"] {
            assert_eq!(classify(text), Intent::Ignore, "input: {:?}", text);
        }
    }

    #[test]
    fn test_plain_question_is_general_query() {
        assert_eq!(
            classify("How tall is the Eiffel Tower?"),
            Intent::GeneralQuery {
                question: "How tall is the Eiffel Tower?".to_string()
            }
        );
    }

    #[test]
    fn test_news_keyword_is_stripped_from_topic() {
        assert_eq!(
            classify("Any news about the election?"),
            Intent::NewsRequest {
                topic: Some("Any  about the election?".to_string()),
                wants_summary: false,
            }
        );
    }

    #[test]
    fn test_weather_question_keeps_weather_in_topic() {
        // First list-order match is "news"; "weather" stays in the topic.
        assert_eq!(
            classify("What's the weather in Chicago news?"),
            Intent::NewsRequest {
                topic: Some("What's the weather in Chicago ?".to_string()),
                wants_summary: false,
            }
        );
    }

    #[test]
    fn test_every_occurrence_of_matched_keyword_is_stripped() {
        assert_eq!(
            classify("News news and more NEWS?"),
            Intent::NewsRequest {
                topic: Some("and more ?".to_string()),
                wants_summary: false,
            }
        );
    }

    #[test]
    fn test_bare_news_question_has_no_topic() {
        assert_eq!(
            classify("news?"),
            Intent::NewsRequest {
                topic: None,
                wants_summary: false,
            }
        );
    }

    #[test]
    fn test_summary_request_detected() {
        let intent = classify("Can you summarize the sports headlines?");
        match intent {
            Intent::NewsRequest { wants_summary, .. } => assert!(wants_summary),
            other => panic!("expected NewsRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_summarise_spelling_detected() {
        let intent = classify("summarise the news?");
        match intent {
            Intent::NewsRequest { wants_summary, .. } => assert!(wants_summary),
            other => panic!("expected NewsRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_substring_matching_is_a_feature() {
        // "newspaper" contains "news"; documented heuristic, not a bug.
        let intent = classify("Where can I buy a newspaper?");
        assert!(matches!(intent, Intent::NewsRequest { .. }));
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        assert!(matches!(
            classify("Any SPORTS today?"),
            Intent::NewsRequest { .. }
        ));
    }

    #[test]
    fn test_clean_strips_all_handle_occurrences() {
        assert_eq!(
            clean_mention_text("@Bot what's up @bot?", "Bot"),
            "what's up ?"
        );
    }

    #[test]
    fn test_clean_preserves_chicago_scenario() {
        let cleaned = clean_mention_text("@Bot What's the weather in Chicago news?", "Bot");
        assert_eq!(cleaned, "What's the weather in Chicago news?");

        let intent = classify(&cleaned);
        match intent {
            Intent::NewsRequest {
                topic,
                wants_summary,
            } => {
                assert_eq!(topic.as_deref(), Some("What's the weather in Chicago ?"));
                assert!(!wants_summary);
            }
            other => panic!("expected NewsRequest, got {:?}", other),
        }
    }
}
