mod app;
mod color_picker;

use std::sync::Arc;

use eframe::{egui, NativeOptions};
use jet_core::{
    AppConfig, DbMapperImpl, JsonPostDao, MainViewModel, PostRepository, PreferenceStore,
};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use crate::app::{AppInit, JetApp};

fn main() -> eframe::Result<()> {
    let config = AppConfig::load();
    init_tracing(&config.log_filter);

    let runtime = Arc::new(Runtime::new().expect("failed to initialise Tokio runtime"));
    let data_dir = data_dir(&config);
    tracing::info!(path = %data_dir.display(), owner = %config.owner, "opening stores");

    let dao = runtime.block_on(JsonPostDao::load_from(data_dir.join("posts.json")));
    let preferences = runtime.block_on(PreferenceStore::load_from(data_dir.join("preferences.json")));

    let (repository, init) = {
        let _guard = runtime.enter();
        PostRepository::start(
            Arc::new(dao),
            Arc::new(DbMapperImpl::new(config.owner.clone())),
            config.owner.clone(),
        )
    };
    let view_model = MainViewModel::new(repository, preferences, runtime.handle().clone());

    let init = AppInit {
        runtime: runtime.clone(),
        view_model,
        init,
    };

    eframe::run_native(
        "JetSamples",
        NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([config.window.width, config.window.height])
                .with_min_inner_size([480.0, 400.0]),
            ..Default::default()
        },
        Box::new(move |_cc| Box::new(JetApp::new(init))),
    )
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn data_dir(config: &AppConfig) -> std::path::PathBuf {
    // Linux: ~/.config/jetsamples unless overridden
    config.resolve_data_dir().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "no config directory, storing data in the working directory");
        std::env::current_dir().unwrap_or_default().join("jetsamples-data")
    })
}
