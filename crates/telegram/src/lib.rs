pub mod commands;
pub mod message;
pub mod notify;

pub use commands::{start_bot, BotDeps};
pub use notify::{forward_signals, TelegramNotifier};
