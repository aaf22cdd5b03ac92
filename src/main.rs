use std::sync::Arc;

use cinedex::{
    AppState, config::Config, db, repository::MovieRepository, router, uploads::UploadStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,cinedex=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let db = db::connect_and_migrate(&config.database_url, config.db_max_connections).await?;

    let uploads = UploadStore::new(&config.upload_dir);
    uploads.ensure_dir().await?;

    let state = Arc::new(AppState {
        config: config.clone(),
        movies: MovieRepository::new(db),
        uploads,
    });

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
