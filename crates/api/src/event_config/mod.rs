mod create_event_config;
mod delete_event_config;
mod get_event_configs;
pub mod subscribers;
mod update_event_config;

use actix_web::web;
use create_event_config::create_event_config_controller;
use delete_event_config::delete_event_config_controller;
use get_event_configs::get_event_configs_controller;
use update_event_config::update_event_config_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/event-configs",
        web::post().to(create_event_config_controller),
    );
    cfg.route(
        "/event-configs/{event_config_id}",
        web::put().to(update_event_config_controller),
    );
    cfg.route(
        "/event-configs/{event_config_id}",
        web::delete().to(delete_event_config_controller),
    );
    cfg.route(
        "/profiles/{profile_id}/event-configs",
        web::get().to(get_event_configs_controller),
    );
}
