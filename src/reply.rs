use crate::resolvers::Article;

/// Platform maximum post length, in characters.
pub const MAX_POST_LEN: usize = 280;

pub const NO_ARTICLES_REPLY: &str = "Sorry, I couldn't find news articles on that topic.";

/// How many headlines a list reply shows.
const HEADLINE_LINES: usize = 3;

/// Content resolved for an intent, ready to be rendered into a reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedContent {
    /// Headlines for a news request; empty means "nothing found".
    Articles(Vec<Article>),
    /// First headline plus a generated one-paragraph summary of it.
    Summary { article: Article, summary: String },
    /// Generated answer to a general question.
    Answer(String),
}

/// Render resolved content into the reply body. Pure: identical input
/// yields byte-identical output.
pub fn compose_body(content: &ResolvedContent) -> String {
    match content {
        ResolvedContent::Articles(articles) if articles.is_empty() => {
            NO_ARTICLES_REPLY.to_string()
        }
        ResolvedContent::Articles(articles) => {
            let mut lines = vec!["Here are the top headlines:".to_string()];
            for (n, article) in articles.iter().take(HEADLINE_LINES).enumerate() {
                lines.push(format!("{}. {} - {}", n + 1, article.title, article.url));
            }
            lines.join("\n")
        }
        ResolvedContent::Summary { article, summary } => format!(
            "Summary of '{}': {}\nRead more: {}",
            article.title, summary, article.url
        ),
        ResolvedContent::Answer(text) => text.clone(),
    }
}

/// Full reply: `@handle ` prefix plus the body, cut down to the platform
/// limit. Truncation only ever removes body text (the prefix is what
/// threads the reply) and never leaves half a URL behind.
pub fn compose_reply(author_handle: &str, content: &ResolvedContent) -> String {
    let prefix = format!("@{} ", author_handle);
    let body = compose_body(content);
    truncate_to_limit(&prefix, &body, MAX_POST_LEN)
}

fn truncate_to_limit(prefix: &str, body: &str, max: usize) -> String {
    let prefix_chars = prefix.chars().count();
    if prefix_chars + body.chars().count() <= max {
        return format!("{}{}", prefix, body);
    }

    let budget = max.saturating_sub(prefix_chars);
    let cut = body
        .char_indices()
        .nth(budget)
        .map(|(i, _)| i)
        .unwrap_or(body.len());
    let cut = back_out_of_url(body, cut);
    format!("{}{}", prefix, body[..cut].trim_end())
}

/// If the byte offset `cut` lands inside a URL, move it back to the start
/// of that URL so the whole URL is dropped instead of split.
fn back_out_of_url(body: &str, cut: usize) -> usize {
    // The "http" marker may itself straddle the cut, so search a few bytes
    // past it. Walking back to a char boundary keeps the slice valid; the
    // skipped bytes belong to a multi-byte char that can't spell "http".
    let mut window = (cut + 3).min(body.len());
    while !body.is_char_boundary(window) {
        window -= 1;
    }
    if let Some(start) = body[..window].rfind("http") {
        let end = body[start..]
            .find(char::is_whitespace)
            .map(|i| start + i)
            .unwrap_or(body.len());
        if start < cut && end > cut {
            return start;
        }
    }
    cut
}
