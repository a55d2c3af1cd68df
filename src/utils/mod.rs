pub mod jwt;
pub mod password;
pub mod round_name;

pub use jwt::*;
pub use password::*;
pub use round_name::weekly_round_name;
