mod get_settings;
mod set_settings;
pub mod subscribers;

use actix_web::web;
use get_settings::get_settings_controller;
use set_settings::set_settings_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/profiles/{profile_id}/schedule-settings",
        web::get().to(get_settings_controller),
    );
    cfg.route(
        "/profiles/{profile_id}/schedule-settings",
        web::put().to(set_settings_controller),
    );
}
