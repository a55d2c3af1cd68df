pub mod allocation_service;
pub mod auth_service;
pub mod draw_service;
pub mod eligibility;
pub mod events;
pub mod ranking;
pub mod round_service;
pub mod statistics_service;

pub use allocation_service::*;
pub use auth_service::*;
pub use draw_service::*;
pub use events::*;
pub use round_service::*;
pub use statistics_service::*;
