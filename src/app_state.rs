use std::sync::Arc;

use crate::{
    config::Config,
    services::{
        DefaultDocumentIngestor, DocumentIngestor, OpenAiQuestionProvider, QuestionProvider,
        SessionRegistry,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionRegistry>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let provider = Arc::new(OpenAiQuestionProvider::new(&config));
        let ingestor = Arc::new(DefaultDocumentIngestor);
        Self::with_collaborators(config, provider, ingestor)
    }

    /// Wires the registry with explicit provider and ingestor implementations.
    pub fn with_collaborators(
        config: Config,
        provider: Arc<dyn QuestionProvider>,
        ingestor: Arc<dyn DocumentIngestor>,
    ) -> Self {
        Self {
            sessions: Arc::new(
                SessionRegistry::new(provider, ingestor)
                    .with_limits(config.session_idle_ttl, config.max_sessions),
            ),
            config: Arc::new(config),
        }
    }
}
