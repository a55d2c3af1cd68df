pub mod admin;
pub mod auth;
pub mod events;
pub mod round;
pub mod statistics;
pub mod ticket;

pub use admin::admin_config;
pub use auth::auth_config;
pub use events::events_config;
pub use round::round_config;
pub use statistics::statistics_config;
pub use ticket::ticket_config;

use actix_web::web;

/// Every route under /api/v1
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.configure(auth_config)
        .configure(round_config)
        .configure(ticket_config)
        .configure(statistics_config)
        .configure(events_config)
        .configure(admin_config);
}
