//! 问答服务
//!
//! 把目录获取、姓名解析、成员匹配和话题抽取串成一次问答。

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::models::directory::AuthorDirectory;
use crate::observability::{AnswerKind, AppMetrics};
use crate::qa::{NameResolver, Question, TopicExtractor, formatter, matcher};
use crate::services::fetcher::DirectoryFetcher;

/// 一次问答的结果
#[derive(Debug, Clone)]
pub struct AskOutcome {
    pub answer: String,
    pub kind: AnswerKind,
    pub member: Option<String>,
    pub topic: Option<&'static str>,
}

impl AskOutcome {
    fn canned(answer: String, kind: AnswerKind) -> Self {
        Self {
            answer,
            kind,
            member: None,
            topic: None,
        }
    }
}

#[async_trait]
pub trait AskService: Send + Sync {
    /// 回答问题；任何失败都以文字回答的形式返回
    async fn answer(&self, question: &str) -> AskOutcome;

    /// 当前目录中的全部成员名
    async fn members(&self) -> Vec<String>;
}

pub struct AskServiceImpl {
    fetcher: Arc<dyn DirectoryFetcher>,
    resolver: NameResolver,
    extractor: TopicExtractor,
    metrics: Arc<AppMetrics>,
    max_suggestions: usize,
}

impl AskServiceImpl {
    pub fn new(
        fetcher: Arc<dyn DirectoryFetcher>,
        resolver: NameResolver,
        extractor: TopicExtractor,
        metrics: Arc<AppMetrics>,
        max_suggestions: usize,
    ) -> Self {
        Self {
            fetcher,
            resolver,
            extractor,
            metrics,
            max_suggestions,
        }
    }

    /// 针对给定目录回答问题，不访问上游
    pub fn answer_with(&self, directory: &AuthorDirectory, question: &Question) -> AskOutcome {
        let Some(resolution) = self.resolver.resolve_with_source(&question.text) else {
            debug!("No member name found in question: {:?}", question.text);
            return AskOutcome::canned(formatter::unidentified(), AnswerKind::Unidentified);
        };
        debug!(
            "Resolved key {:?} via {:?}",
            resolution.key, resolution.source
        );

        let Some(author) = matcher::match_member(directory, &resolution.key) else {
            let suggestions: Vec<&str> = directory
                .authors()
                .iter()
                .take(self.max_suggestions)
                .map(|a| a.name.as_str())
                .collect();
            return AskOutcome::canned(
                formatter::not_found(&resolution.key, &suggestions),
                AnswerKind::NotFound,
            );
        };

        let answer = self.extractor.extract_with_topic(author, question);
        debug!(
            "Answered with topic {} for {} ({} messages)",
            answer.topic,
            author.name,
            author.message_count()
        );

        AskOutcome {
            answer: answer.text,
            kind: AnswerKind::Answered,
            member: Some(author.name.clone()),
            topic: Some(answer.topic),
        }
    }
}

#[async_trait]
impl AskService for AskServiceImpl {
    async fn answer(&self, question: &str) -> AskOutcome {
        let question = Question::new(question);

        let outcome = if question.is_empty() {
            AskOutcome::canned(formatter::prompt(), AnswerKind::Prompt)
        } else {
            let directory = self.fetcher.fetch().await;
            if directory.is_empty() {
                AskOutcome::canned(formatter::no_data(), AnswerKind::NoData)
            } else {
                self.answer_with(&directory, &question)
            }
        };

        self.metrics.record_answer(outcome.kind);
        info!(
            kind = ?outcome.kind,
            member = outcome.member.as_deref().unwrap_or("-"),
            topic = outcome.topic.unwrap_or("-"),
            "Answered question"
        );
        outcome
    }

    async fn members(&self) -> Vec<String> {
        self.fetcher.fetch().await.names()
    }
}

pub fn create_ask_service(
    fetcher: Arc<dyn DirectoryFetcher>,
    known_members: &[String],
    max_snippet_chars: usize,
    max_suggestions: usize,
    metrics: Arc<AppMetrics>,
) -> Box<dyn AskService> {
    Box::new(AskServiceImpl::new(
        fetcher,
        NameResolver::new(known_members),
        TopicExtractor::with_defaults(max_snippet_chars),
        metrics,
        max_suggestions,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use crate::models::message::MessagePage;
    use crate::observability::FetchKind;
    use crate::services::cache::CacheStats;
    use crate::services::fetcher::{DirectoryFetcherImpl, FetchOutcome};
    use crate::services::source::{MessageSource, StaticMessageSource};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts how often the pipeline asks for the directory
    struct CountingFetcher {
        inner: DirectoryFetcherImpl,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DirectoryFetcher for CountingFetcher {
        async fn fetch_outcome(&self) -> FetchOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_outcome().await
        }

        async fn fetch_page(&self) -> Result<MessagePage> {
            self.inner.fetch_page().await
        }

        fn invalidate(&self) {}

        fn cache_stats(&self) -> Option<CacheStats> {
            None
        }

        fn source_description(&self) -> String {
            "counting".into()
        }
    }

    struct DownSource;

    #[async_trait]
    impl MessageSource for DownSource {
        async fn fetch_messages(&self) -> Result<MessagePage> {
            Err(AppError::Upstream("connection refused".into()))
        }

        fn describe(&self) -> String {
            "down".into()
        }
    }

    fn service_over(source: Arc<dyn MessageSource>) -> (AskServiceImpl, Arc<CountingFetcher>) {
        let metrics = Arc::new(AppMetrics::default());
        let fetcher = Arc::new(CountingFetcher {
            inner: DirectoryFetcherImpl::new(source, None, metrics.clone(), false),
            calls: AtomicUsize::new(0),
        });
        let known: Vec<String> = crate::config::config::ResolverConfig::default().known_members;
        let service = AskServiceImpl::new(
            fetcher.clone(),
            NameResolver::new(&known),
            TopicExtractor::with_defaults(150),
            metrics,
            5,
        );
        (service, fetcher)
    }

    #[tokio::test]
    async fn test_layla_trip() {
        let (service, _) = service_over(Arc::new(StaticMessageSource::sample()));
        let outcome = service
            .answer("When is Layla planning her trip to London")
            .await;

        assert!(outcome.answer.contains("Layla"));
        assert!(outcome.answer.contains("June"));
        assert_eq!(outcome.topic, Some("trip"));
    }

    #[tokio::test]
    async fn test_vikram_cars() {
        let (service, _) = service_over(Arc::new(StaticMessageSource::sample()));
        let outcome = service.answer("How many cars does Vikram have").await;

        assert_eq!(outcome.answer, "Vikram Desai has 2 car(s).");
        assert_eq!(outcome.member.as_deref(), Some("Vikram Desai"));
    }

    #[tokio::test]
    async fn test_unidentified() {
        let (service, _) = service_over(Arc::new(StaticMessageSource::sample()));
        let outcome = service.answer("What's the weather").await;

        assert_eq!(outcome.answer, formatter::unidentified());
        assert_eq!(outcome.kind, AnswerKind::Unidentified);
    }

    #[tokio::test]
    async fn test_empty_question_skips_pipeline() {
        let (service, fetcher) = service_over(Arc::new(StaticMessageSource::sample()));

        let outcome = service.answer("   ").await;

        assert_eq!(outcome.answer, formatter::prompt());
        assert_eq!(outcome.kind, AnswerKind::Prompt);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_member_lists_suggestions() {
        let (service, _) = service_over(Arc::new(StaticMessageSource::sample()));
        let outcome = service.answer("How many cars does Thiago have").await;

        assert_eq!(outcome.kind, AnswerKind::NotFound);
        assert_eq!(
            outcome.answer,
            "I couldn't find member 'thiago'. Available members: Sophia Al-Farsi, Layla Kawaguchi, Vikram Desai, Amina Van Den Berg"
        );
    }

    #[tokio::test]
    async fn test_upstream_down_is_soft() {
        let (service, fetcher) = service_over(Arc::new(DownSource));
        let outcome = service.answer("How many cars does Vikram have").await;

        assert_eq!(outcome.answer, formatter::no_data());
        assert_eq!(outcome.kind, AnswerKind::NoData);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            fetcher.inner.fetch_outcome().await.kind,
            FetchKind::Failed
        );
    }

    #[tokio::test]
    async fn test_members() {
        let (service, _) = service_over(Arc::new(StaticMessageSource::sample()));
        let members = service.members().await;
        assert_eq!(members.len(), 4);
        assert_eq!(members[0], "Sophia Al-Farsi");
    }
}
