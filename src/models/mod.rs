pub mod auth;
pub mod common;
pub mod draw;
pub mod pagination;
pub mod round;
pub mod statistics;
pub mod ticket;

pub use auth::*;
pub use common::*;
pub use draw::*;
pub use pagination::*;
pub use round::*;
pub use statistics::*;
pub use ticket::*;
