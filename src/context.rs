//! Service context that bundles all port trait objects.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::adapters::disabled::DisabledNewsSource;
use crate::adapters::live::dalle::DalleGenerator;
use crate::adapters::live::http_client;
use crate::adapters::live::instagram::InstagramPublisher;
use crate::adapters::live::nytimes::NyTimesSource;
use crate::adapters::live::openai_chat::OpenAiChat;
use crate::adapters::live::x::XPublisher;
use crate::adapters::recording::image_generator::RecordingImageGenerator;
use crate::adapters::recording::news_source::RecordingNewsSource;
use crate::adapters::recording::prompt_generator::RecordingPromptGenerator;
use crate::adapters::recording::publisher::RecordingPublisher;
use crate::adapters::replaying::image_generator::ReplayingImageGenerator;
use crate::adapters::replaying::news_source::ReplayingNewsSource;
use crate::adapters::replaying::prompt_generator::ReplayingPromptGenerator;
use crate::adapters::replaying::publisher::ReplayingPublisher;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::config::Config;
use crate::error::AdapterError;
use crate::orchestrator::ContentOrchestrator;
use crate::ports::{ImageGenerator, NewsSource, PromptGenerator, Publisher};

/// Which ports a command needs wired to real services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// News, prompt, image and every configured publisher.
    Pipeline,
    /// Prompt and image generation only. No news source, no publishers.
    Generation,
}

/// Bundles all port trait objects into a single context.
pub struct ServiceContext {
    /// News source port.
    pub news: Box<dyn NewsSource>,
    /// Prompt generator port.
    pub prompts: Box<dyn PromptGenerator>,
    /// Image generator port.
    pub images: Box<dyn ImageGenerator>,
    /// Publisher ports, in configuration order.
    pub publishers: Vec<Box<dyn Publisher>>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Finish the recording and write the cassette file to disk.
    ///
    /// All recording adapters must have been dropped first.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| "Recording adapter still has references".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        debug!(interactions = recorder.len(), "Writing cassette");
        recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

impl ServiceContext {
    /// Create a live context talking to the configured services.
    ///
    /// # Errors
    ///
    /// Returns an error if a credential needed by `scope` is missing, if a
    /// configured publisher is unknown, or if the HTTP client cannot be built.
    pub fn live(config: &Config, scope: Scope) -> Result<Self, AdapterError> {
        let client = http_client(config.http.timeout())?;
        let openai_key = config.openai_key()?;

        let prompts = Box::new(OpenAiChat::new(
            client.clone(),
            &config.endpoints.openai,
            openai_key.clone(),
            config.llm.model.clone(),
            config.llm.temperature,
        ));
        let images = Box::new(DalleGenerator::new(
            client.clone(),
            &config.endpoints.openai,
            openai_key,
            config.image.model.clone(),
            config.image.size.clone(),
        ));

        let (news, publishers): (Box<dyn NewsSource>, Vec<Box<dyn Publisher>>) = match scope {
            Scope::Generation => (Box::new(DisabledNewsSource), Vec::new()),
            Scope::Pipeline => {
                let news: Box<dyn NewsSource> = Box::new(NyTimesSource::new(
                    client.clone(),
                    &config.endpoints.nytimes,
                    config.nytimes_key()?,
                ));
                let publishers = config
                    .publish
                    .publishers
                    .iter()
                    .map(|name| live_publisher(name, config, &client))
                    .collect::<Result<Vec<_>, _>>()?;
                (news, publishers)
            }
        };

        Ok(Self { news, prompts, images, publishers })
    }

    /// Create a recording context that wraps every live adapter with a
    /// recorder sharing one cassette.
    ///
    /// # Errors
    ///
    /// Returns an error if the live context cannot be built.
    pub fn recording(
        config: &Config,
        scope: Scope,
    ) -> Result<(Self, RecordingSession), AdapterError> {
        let live = Self::live(config, scope)?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let output_dir = PathBuf::from(".newsgen/cassettes").join(&timestamp);
        let path = output_dir.join("pipeline.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-pipeline"),
            get_commit_hash(),
        )));

        let ctx = Self {
            news: Box::new(RecordingNewsSource::new(live.news, Arc::clone(&recorder))),
            prompts: Box::new(RecordingPromptGenerator::new(live.prompts, Arc::clone(&recorder))),
            images: Box::new(RecordingImageGenerator::new(live.images, Arc::clone(&recorder))),
            publishers: live
                .publishers
                .into_iter()
                .map(|p| {
                    Box::new(RecordingPublisher::new(p, Arc::clone(&recorder))) as Box<dyn Publisher>
                })
                .collect(),
        };

        Ok((ctx, RecordingSession { recorder }))
    }

    /// Create a replaying context from a cassette file.
    ///
    /// The publishers are the ones recorded in the cassette.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, AdapterError> {
        let replayer = CassetteReplayer::load(path)
            .map_err(|e| AdapterError::Config(format!("Failed to load cassette: {e}")))?;
        let names = replayer.publisher_names();
        debug!(cassette = %path.display(), publishers = ?names, "Loaded cassette");

        let replayer = Arc::new(Mutex::new(replayer));
        let publishers = names
            .into_iter()
            .map(|name| {
                Box::new(ReplayingPublisher::new(Arc::clone(&replayer), name)) as Box<dyn Publisher>
            })
            .collect();

        Ok(Self {
            news: Box::new(ReplayingNewsSource::new(Arc::clone(&replayer))),
            prompts: Box::new(ReplayingPromptGenerator::new(Arc::clone(&replayer))),
            images: Box::new(ReplayingImageGenerator::new(replayer)),
            publishers,
        })
    }

    /// Hand the ports over to an orchestrator.
    #[must_use]
    pub fn into_orchestrator(self) -> ContentOrchestrator {
        ContentOrchestrator::new(self.news, self.prompts, self.images, self.publishers)
    }
}

fn live_publisher(
    name: &str,
    config: &Config,
    client: &reqwest::Client,
) -> Result<Box<dyn Publisher>, AdapterError> {
    match name {
        "x" => Ok(Box::new(XPublisher::new(client.clone(), &config.endpoints.x, config.x_token()?))),
        "instagram" => {
            let (token, user_id) = config.instagram_credentials()?;
            Ok(Box::new(InstagramPublisher::new(
                client.clone(),
                &config.endpoints.instagram,
                config.endpoints.instagram_api_version.clone(),
                token,
                user_id,
            )))
        }
        other => Err(AdapterError::InvalidArgument(format!(
            "Unknown publisher '{other}'. Valid: x, instagram"
        ))),
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
