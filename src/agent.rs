use tracing::debug;

use crate::intent::{classify, Intent};
use crate::reply::{compose_body, ResolvedContent};
use crate::resolvers::llm::LlmClient;
use crate::resolvers::news::NewsClient;

/// How many headlines to request per news lookup.
const HEADLINE_LIMIT: u32 = 3;

/// The classify → resolve → compose core, shared by the mention poller and
/// the `/ask` endpoint. Holds no mutable state.
pub struct Agent {
    news: NewsClient,
    llm: LlmClient,
}

impl Agent {
    pub fn new(news: NewsClient, llm: LlmClient) -> Self {
        Self { news, llm }
    }

    /// Turn an intent into reply content. `None` means "do not reply".
    ///
    /// Resolver failures never surface here: headlines degrade to an empty
    /// list and answers degrade to a fallback string, so callers only ever
    /// branch on emptiness.
    pub async fn resolve(&self, intent: &Intent) -> Option<ResolvedContent> {
        match intent {
            Intent::Ignore => None,
            Intent::NewsRequest {
                topic,
                wants_summary,
            } => {
                let articles = self
                    .news
                    .headlines_or_empty(topic.as_deref(), HEADLINE_LIMIT)
                    .await;
                if *wants_summary {
                    if let Some(article) = articles.into_iter().next() {
                        let prompt = format!(
                            "Summarize the news article titled '{}' ({}) in one short paragraph.",
                            article.title, article.url
                        );
                        let summary = self.llm.answer_or_fallback(&prompt).await;
                        Some(ResolvedContent::Summary { article, summary })
                    } else {
                        Some(ResolvedContent::Articles(Vec::new()))
                    }
                } else {
                    Some(ResolvedContent::Articles(articles))
                }
            }
            Intent::GeneralQuery { question } => {
                let answer = self.llm.answer_or_fallback(question).await;
                Some(ResolvedContent::Answer(answer))
            }
        }
    }

    /// Run the pipeline on an ad-hoc question without posting anything.
    /// Returns `None` when the text would be ignored as a mention.
    pub async fn answer_question(&self, text: &str) -> Option<String> {
        let cleaned = text.trim();
        let intent = classify(cleaned);
        debug!("Ad-hoc question classified as {:?}", intent);
        let content = self.resolve(&intent).await?;
        Some(compose_body(&content))
    }
}
