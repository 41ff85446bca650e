use std::sync::Arc;

use teloxide::{
    dispatching::UpdateHandler,
    prelude::*,
    utils::command::BotCommands,
};
use tokio::sync::{mpsc, RwLock};
use tracing::{info, warn};

use common::{EngineCommand, EngineState};

use crate::message::display_pair;

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Dependencies injected into every handler via `dptree`.
#[derive(Clone)]
pub struct BotDeps {
    pub command_tx: mpsc::Sender<EngineCommand>,
    pub engine_state: Arc<RwLock<EngineState>>,
    pub allowed_user_ids: Arc<Vec<i64>>,
    pub pairs: Arc<Vec<String>>,
    pub interval: String,
}

/// Telegram bot commands exposed to the operator.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "SignalBot commands:")]
pub enum Command {
    #[command(description = "Show this help")]
    Help,
    #[command(description = "Show engine status and watched pairs")]
    Status,
    #[command(description = "Pause market scans")]
    Pause,
    #[command(description = "Resume market scans")]
    Resume,
    #[command(description = "Scan all pairs now")]
    Scan,
}

/// Start the Telegram bot in long-polling mode.
pub async fn start_bot(bot: Bot, deps: BotDeps) {
    let deps = Arc::new(deps);

    info!("Telegram bot starting (long-polling)");

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![deps])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync>> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Help].endpoint(handle_help))
        .branch(case![Command::Status].endpoint(handle_status))
        .branch(case![Command::Pause].endpoint(handle_pause))
        .branch(case![Command::Resume].endpoint(handle_resume))
        .branch(case![Command::Scan].endpoint(handle_scan));

    Update::filter_message()
        .filter_map(|msg: Message| msg.from().map(|u| u.id))
        .filter_async(auth_filter)
        .branch(command_handler)
}

/// Silently drop messages from users not in the allowed list.
async fn auth_filter(user_id: UserId, deps: Arc<BotDeps>) -> bool {
    let uid = user_id.0 as i64;
    let allowed = deps.allowed_user_ids.contains(&uid);
    if !allowed {
        warn!(user_id = uid, "Unauthorized Telegram access attempt");
    }
    allowed
}

async fn handle_help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

async fn handle_status(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    let state = *deps.engine_state.read().await;
    let text = status_text(state, &deps.pairs, &deps.interval);
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

async fn handle_pause(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    let state = *deps.engine_state.read().await;
    if state != EngineState::Running {
        bot.send_message(msg.chat.id, format!("Engine is {state}, nothing to pause."))
            .await?;
    } else {
        let _ = deps.command_tx.send(EngineCommand::Pause).await;
        bot.send_message(msg.chat.id, "Scans paused.").await?;
    }
    Ok(())
}

async fn handle_resume(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    let state = *deps.engine_state.read().await;
    if state != EngineState::Paused {
        bot.send_message(msg.chat.id, format!("Engine is {state}, nothing to resume."))
            .await?;
    } else {
        let _ = deps.command_tx.send(EngineCommand::Resume).await;
        bot.send_message(msg.chat.id, "Scans resumed.").await?;
    }
    Ok(())
}

async fn handle_scan(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    let _ = deps.command_tx.send(EngineCommand::ScanNow).await;
    bot.send_message(msg.chat.id, "Scanning all pairs\u{2026}").await?;
    Ok(())
}

fn status_text(state: EngineState, pairs: &[String], interval: &str) -> String {
    let pairs: Vec<String> = pairs.iter().map(|p| display_pair(p)).collect();
    format!(
        "SignalBot Status\n\
         Engine: {state}\n\
         Interval: {interval}\n\
         Pairs: {}",
        pairs.join(", ")
    )
}
