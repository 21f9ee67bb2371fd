//! The three section resolvers the HTTP layer dispatches to (§4, §6).

pub mod configuration;
pub mod dialplan;
pub mod directory;
