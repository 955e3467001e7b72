use actix_web::web;

use crate::ws::session::upgrade;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/drafts/{draft_id}", web::get().to(upgrade));
}
