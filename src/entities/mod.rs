pub mod lottery_rounds;
pub mod tickets;

pub use lottery_rounds as round_entity;
pub use tickets as ticket_entity;
