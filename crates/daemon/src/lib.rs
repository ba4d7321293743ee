//! Stock watcher daemon: polls the game-status feed on two cadences, announces
//! changes on a Discord channel and answers the `/stock` slash command.

pub mod config;
pub mod discord;
pub mod error;
pub mod feed;
pub mod http;
pub mod notifier;
pub mod query;
pub mod scheduler;
pub mod verify;
