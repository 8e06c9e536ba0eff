use crate::error::Result;
use crate::services::{bot_service::BotService, telegram_service::TelegramService};

/// Long-polling delivery of bot updates. Owned by a single task.
pub struct PollingService {
    telegram: TelegramService,
    bot: BotService,
    timeout_secs: u64,
    offset: Option<i64>,
}

impl PollingService {
    pub fn new(telegram: TelegramService, bot: BotService, timeout_secs: u64) -> Self {
        Self {
            telegram,
            bot,
            timeout_secs,
            offset: None,
        }
    }

    /// Fetches one batch and hands each update to its own task, so a slow
    /// reply to one chat never holds up another. Returns whether anything arrived.
    pub async fn run_once(&mut self) -> Result<bool> {
        let updates = self.telegram.get_updates(self.offset, self.timeout_secs).await?;
        if updates.is_empty() {
            return Ok(false);
        }

        for update in updates {
            self.offset = Some(update.update_id + 1);
            let bot = self.bot.clone();
            tokio::spawn(async move {
                bot.handle_update(update).await;
            });
        }
        Ok(true)
    }
}
