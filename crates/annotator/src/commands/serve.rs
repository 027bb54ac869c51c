use crate::web::{self, AppState};
use annotator_core::{Config, Session, CONFIG_FILE};
use annotator_gateway::{CompletionGateway, Credentials, ProviderId};
use annotator_store::RecordStore;
use std::path::Path;
use tracing::info;

pub fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) if !path.exists() => {
            anyhow::bail!("config file not found: {}", path.display());
        }
        Some(path) => Config::load(path),
        None => Config::load(Path::new(CONFIG_FILE)),
    };

    // Interactions are handled one at a time, so one thread is enough
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(config))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let store = RecordStore::open(&config.data_file);
    let gateway = CompletionGateway::new(config.gateway_config())?;

    let credentials = Credentials::from_env();
    for provider in ProviderId::ALL {
        if credentials.has(provider) {
            info!(provider = %provider, "API key loaded from {}", provider.credential_env_var());
        }
    }

    let session = Session::new(credentials);
    println!("Reference key: {}", session.id());
    println!("Annotations file: {}", store.path().display());

    let state = AppState::new(session, store, gateway);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    println!("Open http://{}/ to start annotating", listener.local_addr()?);

    axum::serve(listener, web::build_router(state)).await?;
    Ok(())
}
