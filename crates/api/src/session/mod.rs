mod create_session;
mod notify_session;

use actix_web::web;
use create_session::create_session_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/exams/{slug}/sessions",
        web::post().to(create_session_controller),
    );
}
