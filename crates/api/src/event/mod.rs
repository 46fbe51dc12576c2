mod apply_missed_option;
mod complete_event;
pub(crate) mod create_event;
mod delete_event;
mod get_event;
mod get_events;
mod get_missed_options;
mod miss_event;
mod recovery;
mod reschedule_event;
pub mod subscribers;
mod update_event;

#[cfg(test)]
pub(crate) mod test_helpers;

use actix_web::web;
use apply_missed_option::apply_missed_option_controller;
use complete_event::complete_event_controller;
use create_event::create_event_controller;
use delete_event::delete_event_controller;
use get_event::get_event_controller;
use get_events::get_events_controller;
use get_missed_options::get_missed_options_controller;
use miss_event::miss_event_controller;
use reschedule_event::reschedule_event_controller;
use update_event::update_event_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/events", web::post().to(create_event_controller));
    cfg.route("/events/{event_id}", web::get().to(get_event_controller));
    cfg.route("/events/{event_id}", web::put().to(update_event_controller));
    cfg.route(
        "/events/{event_id}",
        web::delete().to(delete_event_controller),
    );
    cfg.route(
        "/events/{event_id}/complete",
        web::post().to(complete_event_controller),
    );
    cfg.route(
        "/events/{event_id}/miss",
        web::post().to(miss_event_controller),
    );
    cfg.route(
        "/events/{event_id}/missed-options",
        web::get().to(get_missed_options_controller),
    );
    cfg.route(
        "/events/{event_id}/missed-options/apply",
        web::post().to(apply_missed_option_controller),
    );
    cfg.route(
        "/events/{event_id}/reschedule",
        web::post().to(reschedule_event_controller),
    );
    cfg.route(
        "/profiles/{profile_id}/events",
        web::get().to(get_events_controller),
    );
}
