//! The content pipeline: article, prompt, image, then fan-out publishing.

use std::future::Future;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{AdapterError, ContentError};
use crate::ports::{
    Article, ImageGenerator, ImageLocation, NewsSource, PromptGenerator, PublishRequest, Publisher,
};

const PROMPT_INSTRUCTION: &str =
    "Generate a single sentence image prompt based on the following news title and body:";
const PROMPT_SAFETY: &str = " Do not include prompts that will be rejected by the Dalle safety system. \
For example mentioning dictators like Vladimir Putin.";
const PROMPT_EXAMPLES: &str = " Examples of good prompts\n\
- 3D render of a pink balloon dog in a violet room\n\
- Illustration of a happy cat sitting on a couch in a living room with a coffee mug in its hand";

/// Build the instruction sent to the language model for an article.
///
/// The wording is fixed.
#[must_use]
pub fn image_prompt_request(article: &Article) -> String {
    format!(
        "{PROMPT_INSTRUCTION}\nTitle: {}\nBody: {}\n{PROMPT_SAFETY}\n\n{PROMPT_EXAMPLES}",
        article.title, article.body
    )
}

/// What a successful run produced.
///
/// Publisher results are not part of it. They only appear in the logs.
#[derive(Debug)]
pub struct RunSummary {
    /// The article the run was based on.
    pub article: Article,
    /// The generated image prompt.
    pub prompt: String,
    /// The generated image.
    pub image: ImageLocation,
}

/// Sequences the news, prompt and image adapters and fans the result out to
/// every publisher.
pub struct ContentOrchestrator {
    news: Box<dyn NewsSource>,
    prompts: Box<dyn PromptGenerator>,
    images: Box<dyn ImageGenerator>,
    publishers: Vec<Box<dyn Publisher>>,
}

impl ContentOrchestrator {
    /// Assemble an orchestrator from its collaborators.
    #[must_use]
    pub fn new(
        news: Box<dyn NewsSource>,
        prompts: Box<dyn PromptGenerator>,
        images: Box<dyn ImageGenerator>,
        publishers: Vec<Box<dyn Publisher>>,
    ) -> Self {
        Self { news, prompts, images, publishers }
    }

    /// Names of the configured publishers.
    pub fn publisher_names(&self) -> impl Iterator<Item = &str> {
        self.publishers.iter().map(|p| p.name())
    }

    /// Run the whole pipeline once.
    ///
    /// The run succeeds once the image exists. Publisher failures are logged
    /// and never returned.
    ///
    /// # Errors
    ///
    /// Returns the first failure among fetching the article, writing the
    /// prompt and generating the image, or [`ContentError::Cancelled`].
    pub async fn generate_content(
        &self,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, ContentError> {
        let article =
            run_step(cancel, "fetch_article", self.news.main_article(), ContentError::UpstreamFetch)
                .await?;
        debug!(title = %article.title, url = %article.url, source = %article.source, "Got article");

        let request = image_prompt_request(&article);
        let prompt = run_step(
            cancel,
            "create_prompt",
            self.prompts.chat(&request),
            ContentError::PromptGeneration,
        )
        .await?;
        debug!(image_prompt = %prompt, "Got image prompt");

        let image = run_step(
            cancel,
            "generate_image",
            self.images.generate_image(&prompt),
            ContentError::ImageGeneration,
        )
        .await?;
        debug!(image = %image, generator = self.images.name(), "Generated image");

        let request = PublishRequest {
            image,
            prompt,
            generator: self.images.name().to_string(),
            article,
        };
        let failed = self.publish_all(&request, cancel).await;
        info!(
            publishers = self.publishers.len(),
            published = self.publishers.len() - failed,
            failed,
            "Content run finished"
        );

        let PublishRequest { image, prompt, article, .. } = request;
        Ok(RunSummary { article, prompt, image })
    }

    /// Send raw text to the prompt generator.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::PromptGeneration`] or [`ContentError::Cancelled`].
    pub async fn create_prompt(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ContentError> {
        run_step(cancel, "create_prompt", self.prompts.chat(text), ContentError::PromptGeneration)
            .await
    }

    /// Generate an image for a prompt without fetching news or publishing.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::ImageGeneration`] or [`ContentError::Cancelled`].
    pub async fn generate_image(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<ImageLocation, ContentError> {
        run_step(
            cancel,
            "generate_image",
            self.images.generate_image(prompt),
            ContentError::ImageGeneration,
        )
        .await
    }

    /// Publish to every publisher at once and return how many failed.
    async fn publish_all(&self, request: &PublishRequest, cancel: &CancellationToken) -> usize {
        let units = self.publishers.iter().map(|publisher| async move {
            let name = publisher.name();
            debug!(publisher = %name, "Publishing image");
            let result = until_cancelled(cancel, publisher.publish(request))
                .await
                .unwrap_or(Err(AdapterError::Cancelled));
            match result {
                Ok(()) => {
                    info!(publisher = %name, "Published image");
                    false
                }
                Err(e) => {
                    error!(publisher = %name, error = %e, "Error when posting image");
                    true
                }
            }
        });
        join_all(units).await.into_iter().filter(|failed| *failed).count()
    }
}

async fn until_cancelled<F: Future>(cancel: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        out = fut => Some(out),
    }
}

async fn run_step<T, F>(
    cancel: &CancellationToken,
    step: &'static str,
    fut: F,
    wrap: fn(AdapterError) -> ContentError,
) -> Result<T, ContentError>
where
    F: Future<Output = Result<T, AdapterError>>,
{
    match until_cancelled(cancel, fut).await {
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) => {
            error!(step, error = %e, "Pipeline step failed");
            Err(wrap(e))
        }
        None => {
            warn!(step, "Pipeline step cancelled");
            Err(ContentError::Cancelled)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use chrono::NaiveDate;
    use tokio::sync::Barrier;

    use super::*;
    use crate::ports::image_generator::GenerateFuture;
    use crate::ports::news_source::ArticleFuture;
    use crate::ports::prompt_generator::ChatFuture;
    use crate::ports::publisher::PublishFuture;
    use crate::test_logs::capture_logs;

    fn article(title: &str, body: &str) -> Article {
        Article {
            title: title.into(),
            body: body.into(),
            published: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            url: "https://news.example.com/story".into(),
            source: "Example Times".into(),
        }
    }

    fn api_error(message: &str) -> AdapterError {
        AdapterError::Api { status: 500, message: message.into() }
    }

    #[derive(Clone, Default)]
    struct Calls(Arc<AtomicUsize>);

    impl Calls {
        fn hit(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
        fn count(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    struct FakeNews {
        article: Option<Article>,
        calls: Calls,
    }

    impl NewsSource for FakeNews {
        fn main_article(&self) -> ArticleFuture<'_> {
            Box::pin(async move {
                self.calls.hit();
                self.article.clone().ok_or_else(|| api_error("news error"))
            })
        }
    }

    struct FakeChat {
        answer: Option<String>,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl PromptGenerator for FakeChat {
        fn chat(&self, text: &str) -> ChatFuture<'_> {
            let text = text.to_string();
            Box::pin(async move {
                self.seen.lock().unwrap().push(text);
                self.answer.clone().ok_or_else(|| api_error("prompt error"))
            })
        }
    }

    struct FakeImages {
        url: Option<&'static str>,
        calls: Calls,
    }

    impl ImageGenerator for FakeImages {
        fn generate_image(&self, _prompt: &str) -> GenerateFuture<'_> {
            Box::pin(async move {
                self.calls.hit();
                self.url.map(ImageLocation::new).ok_or_else(|| api_error("generation error"))
            })
        }

        fn name(&self) -> &str {
            "TestGenerator"
        }
    }

    enum Behaviour {
        Succeed,
        Fail(&'static str),
        Hang,
        Rendezvous(Arc<Barrier>),
    }

    struct FakePublisher {
        name: &'static str,
        behaviour: Behaviour,
        received: Arc<Mutex<Vec<PublishRequest>>>,
        finished: Calls,
    }

    impl Publisher for FakePublisher {
        fn publish<'a>(&'a self, request: &'a PublishRequest) -> PublishFuture<'a> {
            Box::pin(async move {
                self.received.lock().unwrap().push(request.clone());
                let result = match &self.behaviour {
                    Behaviour::Succeed => Ok(()),
                    Behaviour::Fail(msg) => Err(api_error(msg)),
                    Behaviour::Hang => futures::future::pending().await,
                    Behaviour::Rendezvous(barrier) => {
                        barrier.wait().await;
                        Ok(())
                    }
                };
                self.finished.hit();
                result
            })
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    struct Harness {
        news_calls: Calls,
        chat_seen: Arc<Mutex<Vec<String>>>,
        image_calls: Calls,
        received: Arc<Mutex<Vec<PublishRequest>>>,
        finished: Calls,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                news_calls: Calls::default(),
                chat_seen: Arc::default(),
                image_calls: Calls::default(),
                received: Arc::default(),
                finished: Calls::default(),
            }
        }

        fn publisher(&self, name: &'static str, behaviour: Behaviour) -> Box<dyn Publisher> {
            Box::new(FakePublisher {
                name,
                behaviour,
                received: Arc::clone(&self.received),
                finished: self.finished.clone(),
            })
        }

        fn orchestrator(
            &self,
            article: Option<Article>,
            answer: Option<&str>,
            url: Option<&'static str>,
            publishers: Vec<Box<dyn Publisher>>,
        ) -> ContentOrchestrator {
            ContentOrchestrator::new(
                Box::new(FakeNews { article, calls: self.news_calls.clone() }),
                Box::new(FakeChat {
                    answer: answer.map(str::to_string),
                    seen: Arc::clone(&self.chat_seen),
                }),
                Box::new(FakeImages { url, calls: self.image_calls.clone() }),
                publishers,
            )
        }
    }

    #[test]
    fn prompt_request_embeds_title_and_body() {
        let text = image_prompt_request(&article("T", "B"));
        assert_eq!(
            text,
            "Generate a single sentence image prompt based on the following news title and body:\n\
             Title: T\n\
             Body: B\n \
             Do not include prompts that will be rejected by the Dalle safety system. \
             For example mentioning dictators like Vladimir Putin.\n\n \
             Examples of good prompts\n\
             - 3D render of a pink balloon dog in a violet room\n\
             - Illustration of a happy cat sitting on a couch in a living room with a coffee mug in its hand"
        );
    }

    #[tokio::test]
    async fn happy_path_publishes_everywhere() {
        let h = Harness::new();
        let publishers = vec![
            h.publisher("x", Behaviour::Succeed),
            h.publisher("instagram", Behaviour::Succeed),
        ];
        let orch = h.orchestrator(
            Some(article("T", "B")),
            Some("a pink balloon dog"),
            Some("https://img.example.com/1.png"),
            publishers,
        );

        let summary = orch.generate_content(&CancellationToken::new()).await.unwrap();

        assert_eq!(summary.prompt, "a pink balloon dog");
        assert_eq!(summary.image.as_str(), "https://img.example.com/1.png");
        assert_eq!(h.chat_seen.lock().unwrap().as_slice(), [image_prompt_request(&article("T", "B"))]);
        assert_eq!(h.finished.count(), 2);
    }

    #[tokio::test]
    async fn publishers_receive_identical_values() {
        let h = Harness::new();
        let publishers = vec![
            h.publisher("x", Behaviour::Succeed),
            h.publisher("instagram", Behaviour::Fail("boom")),
            h.publisher("mastodon", Behaviour::Succeed),
        ];
        let prompt = "Illustration of a crowded harbour at dawn, ünïcödé ✓";
        let orch = h.orchestrator(
            Some(article("T", "B")),
            Some(prompt),
            Some("https://img.example.com/a b.png?sig=1"),
            publishers,
        );

        orch.generate_content(&CancellationToken::new()).await.unwrap();

        let received = h.received.lock().unwrap();
        assert_eq!(received.len(), 3);
        for request in received.iter() {
            assert_eq!(request.prompt.as_bytes(), prompt.as_bytes());
            assert_eq!(request.image.as_str(), "https://img.example.com/a b.png?sig=1");
            assert_eq!(request.generator, "TestGenerator");
            assert_eq!(request.article, article("T", "B"));
        }
    }

    #[tokio::test]
    async fn publish_calls_run_concurrently_for_any_set_size() {
        for n in 0..=5 {
            let h = Harness::new();
            let barrier = Arc::new(Barrier::new(n));
            let publishers = (0..n)
                .map(|_| h.publisher("p", Behaviour::Rendezvous(Arc::clone(&barrier))))
                .collect();
            let orch = h.orchestrator(
                Some(article("T", "B")),
                Some("p"),
                Some("https://img.example.com/x.png"),
                publishers,
            );

            // Each publisher waits for all the others, so a sequential fan-out never finishes.
            let summary = tokio::time::timeout(
                Duration::from_secs(5),
                orch.generate_content(&CancellationToken::new()),
            )
            .await
            .expect("publishers did not run concurrently")
            .unwrap();

            assert_eq!(summary.prompt, "p");
            assert_eq!(h.received.lock().unwrap().len(), n);
            assert_eq!(h.finished.count(), n, "returned before every publisher finished");
        }
    }

    #[tokio::test]
    async fn news_failure_stops_the_run() {
        let h = Harness::new();
        let publishers = vec![h.publisher("x", Behaviour::Succeed)];
        let orch =
            h.orchestrator(None, Some("p"), Some("https://img.example.com/x.png"), publishers);

        let err = orch.generate_content(&CancellationToken::new()).await.unwrap_err();

        assert!(matches!(
            err,
            ContentError::UpstreamFetch(AdapterError::Api { status: 500, ref message })
                if message == "news error"
        ));
        assert_eq!(h.news_calls.count(), 1);
        assert!(h.chat_seen.lock().unwrap().is_empty());
        assert_eq!(h.image_calls.count(), 0);
        assert!(h.received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn prompt_failure_skips_image_and_publishing() {
        let h = Harness::new();
        let publishers = vec![h.publisher("x", Behaviour::Succeed)];
        let orch = h.orchestrator(
            Some(article("T", "B")),
            None,
            Some("https://img.example.com/x.png"),
            publishers,
        );

        let err = orch.generate_content(&CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, ContentError::PromptGeneration(_)));
        assert_eq!(err.adapter_error().unwrap().to_string(), "API error (500): prompt error");
        assert_eq!(h.image_calls.count(), 0);
        assert!(h.received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn image_failure_skips_publishing() {
        let h = Harness::new();
        let publishers = vec![h.publisher("x", Behaviour::Succeed)];
        let orch = h.orchestrator(Some(article("T", "B")), Some("p"), None, publishers);

        let err = orch.generate_content(&CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, ContentError::ImageGeneration(_)));
        assert!(h.received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn one_failing_publisher_is_only_logged() {
        let (logs, _guard) = capture_logs();
        let h = Harness::new();
        let publishers = vec![
            h.publisher("x", Behaviour::Succeed),
            h.publisher("instagram", Behaviour::Fail("quota exceeded")),
            h.publisher("mastodon", Behaviour::Succeed),
        ];
        let orch = h.orchestrator(
            Some(article("T", "B")),
            Some("p"),
            Some("https://img.example.com/x.png"),
            publishers,
        );

        let summary = orch.generate_content(&CancellationToken::new()).await.unwrap();

        assert_eq!(h.finished.count(), 3);
        // The summary carries nothing about publishers.
        let RunSummary { article: got, prompt, image } = summary;
        assert_eq!(got, article("T", "B"));
        assert_eq!(prompt, "p");
        assert_eq!(image.as_str(), "https://img.example.com/x.png");

        let output = logs.contents();
        let failures: Vec<&str> =
            output.lines().filter(|l| l.contains("Error when posting image")).collect();
        assert_eq!(failures.len(), 1, "logs: {output}");
        assert!(failures[0].contains("publisher=instagram"), "logs: {output}");
        assert!(failures[0].contains("quota exceeded"), "logs: {output}");
        assert_eq!(output.matches("Published image").count(), 2, "logs: {output}");
        assert!(output.contains("failed=1"), "logs: {output}");
    }

    #[tokio::test]
    async fn cancelled_token_stops_before_any_call() {
        let h = Harness::new();
        let orch = h.orchestrator(Some(article("T", "B")), Some("p"), Some("u"), vec![]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = orch.generate_content(&cancel).await.unwrap_err();

        assert!(matches!(err, ContentError::Cancelled));
        assert_eq!(h.news_calls.count(), 0);
    }

    #[tokio::test]
    async fn cancellation_reaches_in_flight_publishers() {
        let (logs, _guard) = capture_logs();
        let h = Harness::new();
        let publishers = vec![h.publisher("x", Behaviour::Succeed), h.publisher("slow", Behaviour::Hang)];
        let orch = h.orchestrator(
            Some(article("T", "B")),
            Some("p"),
            Some("https://img.example.com/x.png"),
            publishers,
        );
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        tokio::time::timeout(Duration::from_secs(5), orch.generate_content(&cancel))
            .await
            .expect("cancellation did not propagate")
            .unwrap();

        let output = logs.contents();
        let published: Vec<&str> = output.lines().filter(|l| l.contains("Published image")).collect();
        assert_eq!(published.len(), 1, "logs: {output}");
        assert!(published[0].contains("publisher=x"), "logs: {output}");
        let failed: Vec<&str> =
            output.lines().filter(|l| l.contains("Error when posting image")).collect();
        assert_eq!(failed.len(), 1, "logs: {output}");
        assert!(failed[0].contains("publisher=slow"), "logs: {output}");
        assert!(failed[0].contains("cancelled before completion"), "logs: {output}");
    }

    #[tokio::test]
    async fn single_step_operations_use_one_adapter() {
        let h = Harness::new();
        let orch = h.orchestrator(
            None,
            Some("a lighthouse in fog"),
            Some("https://img.example.com/l.png"),
            vec![],
        );
        let cancel = CancellationToken::new();

        assert_eq!(orch.create_prompt("raw text", &cancel).await.unwrap(), "a lighthouse in fog");
        assert_eq!(h.chat_seen.lock().unwrap().as_slice(), ["raw text"]);

        let image = orch.generate_image("a lighthouse in fog", &cancel).await.unwrap();
        assert_eq!(image.as_str(), "https://img.example.com/l.png");
        assert_eq!(h.news_calls.count(), 0);
    }
}
