mod create_profile;
mod get_profile;

use actix_web::web;
use create_profile::create_profile_controller;
use get_profile::get_profile_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/profiles", web::post().to(create_profile_controller));
    cfg.route(
        "/profiles/{profile_id}",
        web::get().to(get_profile_controller),
    );
}
