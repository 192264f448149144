use std::sync::Arc;

use chrono::{DateTime, Utc};
use minijinja::Environment;
use tokio::task::JoinHandle;

use crate::core::config::AppConfig;
use crate::history::{InMemorySessionStore, SessionStore};
use crate::llm::GroqClient;
use crate::pipeline::{AnswerPipeline, PipelineSettings};
use crate::rag::{HttpEmbedder, IndexRetriever, VectorIndex};
use crate::server::page;

pub mod error;

use error::InitializationError;

/// Shared state handed to every route and background task.
///
/// The vector index inside the pipeline is immutable once loaded; the session
/// store is the only mutable piece.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipeline: AnswerPipeline,
    pub sessions: Arc<dyn SessionStore>,
    pub templates: Arc<Environment<'static>>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Builds the production collaborators from `config`.
    ///
    /// Loading the index is fatal: the server does not start without it.
    pub async fn initialize(config: AppConfig) -> Result<Arc<Self>, InitializationError> {
        let index = VectorIndex::load_sqlite(&config.retrieval.index_path)
            .await
            .map_err(InitializationError::Index)?;

        let embedder = HttpEmbedder::new(
            &config.retrieval.embedding_base_url,
            &config.retrieval.embedding_model,
            config.retrieval.timeout,
        )
        .map_err(InitializationError::Embedder)?;
        let retriever = IndexRetriever::new(Arc::new(embedder), Arc::new(index));

        let completion = GroqClient::new(
            &config.completion.base_url,
            config.completion.api_key.clone(),
            config.completion.timeout,
        )
        .map_err(InitializationError::Llm)?;

        let pipeline = AnswerPipeline::new(
            Arc::new(retriever),
            Arc::new(completion),
            PipelineSettings::from_config(&config),
        );
        let sessions = Arc::new(InMemorySessionStore::new(config.session.idle_ttl));

        Self::from_parts(config, pipeline, sessions)
    }

    /// Assembles state from already constructed collaborators.
    pub fn from_parts(
        config: AppConfig,
        pipeline: AnswerPipeline,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Arc<Self>, InitializationError> {
        let templates = page::environment().map_err(InitializationError::Templates)?;

        Ok(Arc::new(Self {
            config: Arc::new(config),
            pipeline,
            sessions,
            templates: Arc::new(templates),
            started_at: Utc::now(),
        }))
    }

    /// Periodically drops idle sessions until the runtime shuts down.
    pub fn spawn_session_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let sessions = self.sessions.clone();
        let period = self.config.session.sweep_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = sessions.purge_expired().await;
                if removed > 0 {
                    tracing::debug!("Swept {} idle sessions", removed);
                }
            }
        })
    }
}
