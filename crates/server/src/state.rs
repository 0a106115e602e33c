use knowbatch::{providers::create_provider, AiProvider, AppConfig};
use std::{path::PathBuf, sync::Arc};

/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub ai_provider: Arc<dyn AiProvider>,
}

impl AppState {
    /// Where rendered reports are written and downloads are served from.
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.report.output_dir)
    }
}

/// Builds the state with the provider named in `config.ai`.
pub fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let ai_provider: Arc<dyn AiProvider> = Arc::from(create_provider(&config.ai)?);
    Ok(AppState {
        config: Arc::new(config),
        ai_provider,
    })
}
