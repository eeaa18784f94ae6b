//! IRC protocol layer: transport session, line grammar, command parsing and
//! the bot engine.

pub mod bot;
pub mod commands;
pub mod connection;
pub mod protocol;

#[cfg(test)]
pub mod testing;
