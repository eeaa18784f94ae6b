//! A minimal Twitch chat bot.
//!
//! The bot connects over plain TCP, authenticates with an OAuth token, joins
//! one channel and watches its chat. The channel owner can stop it with a
//! bang-command.

pub mod app;
pub mod config;
pub mod irc;
pub mod logging;
