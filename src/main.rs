use std::{process, sync::Arc};

use foglio::{
    application::{
        accounts::AccountService, error::AppError, posts::PostService, sessions::SessionResolver,
    },
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, AppState, GuardConfig},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (_cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging)?;

    serve(settings).await
}

async fn serve(settings: config::Settings) -> Result<(), AppError> {
    let database_url = settings.database.url.as_deref().ok_or_else(|| {
        InfraError::configuration("database.url is required (set FOGLIO__DATABASE__URL)")
    })?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| InfraError::database(format!("failed to connect: {err}")))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| InfraError::database(format!("failed to run migrations: {err}")))?;

    let repositories = Arc::new(PostgresRepositories::new(pool));

    let resolver = SessionResolver::new(repositories.clone(), repositories.clone());
    let session_ttl = time::Duration::seconds(settings.auth.session_ttl.as_secs() as i64);

    let posts = Arc::new(PostService::new(
        repositories.clone(),
        resolver.clone(),
        settings.auth.require_owner_for_mutation,
    ));
    let accounts = Arc::new(AccountService::new(
        repositories.clone(),
        repositories.clone(),
        session_ttl,
    ));

    let state = AppState {
        posts,
        accounts,
        db: repositories,
        session_cookie: settings.auth.cookie_name.clone(),
        session_ttl,
    };

    let router = http::build_router(state, GuardConfig::from(&settings.auth));

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;

    info!(
        target = "foglio::server",
        addr = %settings.server.addr,
        owner_policy = settings.auth.require_owner_for_mutation,
        "listening",
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(InfraError::from)?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install shutdown signal handler");
    }
    info!(target = "foglio::server", "shutdown signal received");
}
