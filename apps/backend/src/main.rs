use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use banpick_backend::auth::identity::RosterIdentityProvider;
use banpick_backend::config::AppConfig;
use banpick_backend::infra::state::build_state;
use banpick_backend::middleware::cors::cors_middleware;
use banpick_backend::middleware::request_trace::RequestTrace;
use banpick_backend::middleware::structured_logger::StructuredLogger;
use banpick_backend::middleware::trace_span::TraceSpan;
use banpick_backend::routes;
use banpick_backend::state::security_config::SecurityConfig;
use tracing::{error, info, warn};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    if config.roster.is_empty() {
        warn!("DRAFT_ROSTER is empty; nobody can log in");
    }

    let app_state = match build_state()
        .with_security(SecurityConfig::new(config.jwt_secret.clone()))
        .with_database_url(config.database_url.clone())
        .with_draft_config(config.draft)
        .with_identity(Arc::new(RosterIdentityProvider::new(config.roster.clone())))
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            eprintln!("❌ Failed to build application state: {e}");
            std::process::exit(1);
        }
    };

    info!(
        host = %config.host,
        port = config.port,
        store = app_state.store_kind(),
        turn_seconds = config.draft.turn_duration.as_secs(),
        "starting banpick backend"
    );

    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
