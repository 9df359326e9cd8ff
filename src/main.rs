use astroshelter::{app, schema, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "astroshelter=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::init().await?;

    // Startup schema errors are logged, not fatal; handlers surface storage
    // errors on their own.
    if let Err(e) = schema::ensure_schema(&state.db).await {
        tracing::error!(error = %e, "schema setup failed; continuing");
    }

    let app = app::build_app(state);
    app::serve(app).await
}
