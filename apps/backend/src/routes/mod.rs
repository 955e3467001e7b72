use actix_web::web;

use crate::middleware::jwt_extract::JwtExtract;

pub mod auth;
pub mod drafts;
pub mod health;
pub mod ws;

/// Register every route. `JwtExtract` guards all but `/health` and login;
/// request tracing and logging are wrapped around the whole app by the
/// caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes);
    cfg.service(web::scope("/api/auth").configure(auth::configure_routes));
    cfg.service(
        web::scope("/api/drafts")
            .wrap(JwtExtract)
            .configure(drafts::configure_routes),
    );
    cfg.service(
        web::scope("/ws")
            .wrap(JwtExtract)
            .configure(ws::configure_routes),
    );
}
