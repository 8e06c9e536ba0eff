use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::dto::telegram_dto::{
    InboundEvent, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, ReplyKeyboardMarkup,
    ReplyMarkup, TelegramContact, TelegramUpdate, TelegramUser,
};
use crate::models::{
    message::{MessageMetadata, NewMessage},
    user::UpsertUser,
};
use crate::services::{
    message_service::MessageStore, notification_service::NotificationService,
    user_service::UserStore,
};
use crate::utils::time;

pub const ACTION_SHARE_PHONE: &str = "share_phone";
pub const ACTION_ASK_QUESTION: &str = "ask_question";
pub const ACTION_GENERAL_INQUIRY: &str = "general_inquiry";

const SHARE_PHONE_PROMPT: &str =
    "📱 Please share your phone number using the button below, or simply type it in the chat.";
const ASK_QUESTION_PROMPT: &str = "❓ Please type your question and I'll do my best to help you!";
const GENERAL_INQUIRY_PROMPT: &str = "💬 Please share your inquiry or feedback. I'm here to listen!";
const CONTACT_THANKS: &str =
    "📱 Thank you for sharing your contact information! Our team will reach out to you soon.";
const AUTO_REPLY: &str = "✅ Thank you for your message! \n\n\
Your inquiry has been received and our team will review it shortly. \
We appreciate your patience and will get back to you as soon as possible.\n\n\
If you have any urgent matters, please don't hesitate to send another message.";

/// Dispatches inbound bot events. Holds no per-conversation state: every
/// handler reads and writes only through the stores.
///
/// Persistence and replies are independent best-effort steps. A failed write
/// is logged and the reply still goes out; a failed reply is logged and the
/// writes already made stand.
#[derive(Clone)]
pub struct BotService {
    users: Arc<dyn UserStore>,
    messages: Arc<dyn MessageStore>,
    notifier: NotificationService,
}

impl BotService {
    pub fn new(
        users: Arc<dyn UserStore>,
        messages: Arc<dyn MessageStore>,
        notifier: NotificationService,
    ) -> Self {
        Self {
            users,
            messages,
            notifier,
        }
    }

    pub async fn handle_update(&self, update: TelegramUpdate) {
        let update_id = update.update_id;
        match InboundEvent::from_update(update) {
            Some(event) => self.dispatch(event).await,
            None => debug!(update_id, "Ignoring Telegram update"),
        }
    }

    pub async fn dispatch(&self, event: InboundEvent) {
        match event {
            InboundEvent::StartCommand { sender, chat_id } => self.on_start(&sender, chat_id).await,
            InboundEvent::ButtonPress {
                callback_id,
                chat_id,
                action,
            } => {
                self.on_button_press(&callback_id, chat_id, action.as_deref())
                    .await
            }
            InboundEvent::ContactShared {
                sender,
                chat_id,
                contact,
            } => self.on_contact(&sender, chat_id, &contact).await,
            InboundEvent::TextMessage {
                sender,
                chat_id,
                message_id,
                body,
            } => self.on_text(&sender, chat_id, message_id, &body).await,
        }
    }

    pub async fn on_start(&self, sender: &TelegramUser, chat_id: i64) {
        info!(user_id = sender.id, chat_id, "Handling /start");
        self.record_user(sender, chat_id).await;

        let text = welcome_message(sender.first_name.as_deref().unwrap_or_default());
        if let Err(e) = self
            .notifier
            .send_with_markup(chat_id, &text, welcome_keyboard())
            .await
        {
            warn!(chat_id, error = ?e, "Failed to send welcome message");
        }
    }

    /// Unknown actions send nothing; the callback is acknowledged either way.
    pub async fn on_button_press(&self, callback_id: &str, chat_id: Option<i64>, action: Option<&str>) {
        let reply = match action {
            Some(ACTION_SHARE_PHONE) => Some((SHARE_PHONE_PROMPT, Some(contact_request_keyboard()))),
            Some(ACTION_ASK_QUESTION) => Some((ASK_QUESTION_PROMPT, None)),
            Some(ACTION_GENERAL_INQUIRY) => Some((GENERAL_INQUIRY_PROMPT, None)),
            other => {
                debug!(action = ?other, "Unrecognised button action");
                None
            }
        };

        match (reply, chat_id) {
            (Some((text, markup)), Some(chat_id)) => {
                let sent = match markup {
                    Some(markup) => self.notifier.send_with_markup(chat_id, text, markup).await,
                    None => self.notifier.send(chat_id, text).await,
                };
                if let Err(e) = sent {
                    warn!(chat_id, error = ?e, "Failed to send button prompt");
                }
            }
            (Some(_), None) => debug!(callback_id, "Button press without originating chat"),
            (None, _) => {}
        }

        if let Err(e) = self.notifier.acknowledge(callback_id).await {
            warn!(callback_id, error = ?e, "Failed to answer callback query");
        }
    }

    pub async fn on_contact(&self, sender: &TelegramUser, chat_id: i64, contact: &TelegramContact) {
        info!(user_id = sender.id, chat_id, "Contact shared");
        self.record_user(sender, chat_id).await;

        let msg = NewMessage::contact(
            sender.id,
            chat_id,
            &contact.phone_number,
            MessageMetadata::Contact {
                first_name: contact.first_name.clone(),
                last_name: contact.last_name.clone(),
                user_id: contact.user_id,
            },
        );
        if let Err(e) = self.messages.insert_message(msg).await {
            error!(user_id = sender.id, error = ?e, "Failed to store contact");
        }

        if let Err(e) = self.notifier.send(chat_id, CONTACT_THANKS).await {
            warn!(chat_id, error = ?e, "Failed to send contact acknowledgement");
        }
    }

    pub async fn on_text(&self, sender: &TelegramUser, chat_id: i64, message_id: i64, body: &str) {
        let upsert = self.record_user(sender, chat_id).await;

        let msg = NewMessage::text(
            sender.id,
            chat_id,
            body.to_string(),
            MessageMetadata::Text {
                username: upsert.username.clone(),
                first_name: sender.first_name.clone(),
                last_name: sender.last_name.clone(),
                message_id,
            },
        );
        match self.messages.insert_message(msg).await {
            Ok(_) => info!(user_id = sender.id, "Message stored"),
            Err(e) => error!(user_id = sender.id, error = ?e, "Failed to store message"),
        }

        if let Err(e) = self.notifier.send(chat_id, AUTO_REPLY).await {
            warn!(chat_id, error = ?e, "Failed to send auto-reply");
        }

        let notification = admin_notification(&upsert, body, chat_id);
        if let Err(e) = self.notifier.notify_admin(&notification).await {
            warn!(error = ?e, "Failed to notify admin");
        }
    }

    async fn record_user(&self, sender: &TelegramUser, chat_id: i64) -> UpsertUser {
        let upsert = UpsertUser::from_sender(sender, chat_id);
        if let Err(e) = self.users.upsert_user(upsert.clone()).await {
            error!(user_id = sender.id, error = ?e, "Failed to store user");
        }
        upsert
    }
}

fn welcome_message(first_name: &str) -> String {
    format!(
        "🎉 Welcome {}! \n\n\
I'm your enquiry chat bot. I'm here to help you with any questions or feedback you might have.\n\n\
You can:\n\
📝 Ask me any question\n\
💬 Share your feedback\n\
📱 Contact our support team\n\n\
How can I assist you today?",
        first_name
    )
}

fn welcome_keyboard() -> ReplyMarkup {
    ReplyMarkup::Inline(InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![
                InlineKeyboardButton::new("📱 Share Phone Number", ACTION_SHARE_PHONE),
                InlineKeyboardButton::new("❓ Ask a Question", ACTION_ASK_QUESTION),
            ],
            vec![InlineKeyboardButton::new("💬 General Inquiry", ACTION_GENERAL_INQUIRY)],
        ],
    })
}

fn contact_request_keyboard() -> ReplyMarkup {
    ReplyMarkup::Keyboard(ReplyKeyboardMarkup {
        keyboard: vec![vec![KeyboardButton {
            text: "Share Phone Number".to_string(),
            request_contact: true,
        }]],
        one_time_keyboard: true,
        resize_keyboard: true,
    })
}

fn admin_notification(sender: &UpsertUser, body: &str, chat_id: i64) -> String {
    let name = format!("{} {}", sender.first_name, sender.last_name);
    format!(
        "🔔 New message received:\n\n\
👤 From: {} (@{})\n\
💬 Message: {}\n\
🕒 Time: {}\n\
🆔 Chat ID: {}",
        name.trim(),
        sender.username,
        body,
        time::to_display(time::now()),
        chat_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::message::{MessageType, SenderType};
    use crate::services::memory_store::InMemoryStore;
    use crate::services::telegram_service::MockBotTransport;
    use async_trait::async_trait;

    fn sender() -> TelegramUser {
        TelegramUser {
            id: 42,
            is_bot: false,
            first_name: Some("Ana".into()),
            last_name: Some("Lima".into()),
            username: Some("ana".into()),
        }
    }

    fn service(store: Arc<InMemoryStore>, transport: MockBotTransport, admin: Option<i64>) -> BotService {
        BotService::new(
            store.clone(),
            store,
            NotificationService::new(Arc::new(transport), admin),
        )
    }

    struct FailingStore;

    #[async_trait]
    impl UserStore for FailingStore {
        async fn upsert_user(&self, _user: UpsertUser) -> crate::error::Result<crate::models::user::User> {
            Err(Error::Database(sqlx::Error::PoolTimedOut))
        }
        async fn get_by_user_id(&self, _user_id: i64) -> crate::error::Result<Option<crate::models::user::User>> {
            Err(Error::Database(sqlx::Error::PoolTimedOut))
        }
        async fn list_users(&self) -> crate::error::Result<Vec<crate::models::user::User>> {
            Err(Error::Database(sqlx::Error::PoolTimedOut))
        }
        async fn count_users(&self) -> crate::error::Result<i64> {
            Err(Error::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[async_trait]
    impl MessageStore for FailingStore {
        async fn insert_message(&self, _msg: NewMessage) -> crate::error::Result<crate::models::message::Message> {
            Err(Error::Database(sqlx::Error::PoolTimedOut))
        }
        async fn list_messages(&self) -> crate::error::Result<Vec<crate::models::message::Message>> {
            Err(Error::Database(sqlx::Error::PoolTimedOut))
        }
        async fn latest_for_user(&self, _user_id: i64) -> crate::error::Result<Option<crate::models::message::Message>> {
            Err(Error::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn start_upserts_user_and_sends_keyboard() {
        let store = Arc::new(InMemoryStore::new());
        let mut transport = MockBotTransport::new();
        transport
            .expect_send_message()
            .withf(|chat_id, text, markup| {
                *chat_id == 4200
                    && text.starts_with("🎉 Welcome Ana!")
                    && matches!(markup, Some(ReplyMarkup::Inline(kb)) if kb.inline_keyboard.len() == 2)
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        service(store.clone(), transport, None).on_start(&sender(), 4200).await;

        let user = store.get_by_user_id(42).await.unwrap().unwrap();
        assert_eq!(user.chat_id, 4200);
        assert_eq!(store.message_count().await, 0);
    }

    #[tokio::test]
    async fn share_phone_attaches_contact_keyboard_and_acknowledges() {
        let store = Arc::new(InMemoryStore::new());
        let mut transport = MockBotTransport::new();
        transport
            .expect_send_message()
            .withf(|_, text, markup| {
                text == SHARE_PHONE_PROMPT
                    && matches!(markup, Some(ReplyMarkup::Keyboard(kb)) if kb.one_time_keyboard && kb.keyboard[0][0].request_contact)
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        transport
            .expect_answer_callback_query()
            .withf(|id| id == "cb-1")
            .times(1)
            .returning(|_| Ok(()));

        service(store, transport, None)
            .on_button_press("cb-1", Some(4200), Some(ACTION_SHARE_PHONE))
            .await;
    }

    #[tokio::test]
    async fn unknown_action_sends_nothing_but_acknowledges() {
        let store = Arc::new(InMemoryStore::new());
        let mut transport = MockBotTransport::new();
        transport.expect_send_message().never();
        transport
            .expect_answer_callback_query()
            .times(1)
            .returning(|_| Ok(()));

        service(store, transport, None)
            .on_button_press("cb-2", Some(4200), Some("launch_rockets"))
            .await;
    }

    #[tokio::test]
    async fn acknowledges_even_when_prompt_fails() {
        let store = Arc::new(InMemoryStore::new());
        let mut transport = MockBotTransport::new();
        transport
            .expect_send_message()
            .times(1)
            .returning(|_, _, _| Err(Error::Telegram("blocked".into())));
        transport
            .expect_answer_callback_query()
            .times(1)
            .returning(|_| Ok(()));

        service(store, transport, None)
            .on_button_press("cb-3", Some(4200), Some(ACTION_ASK_QUESTION))
            .await;
    }

    #[tokio::test]
    async fn contact_is_stored_with_phone_label() {
        let store = Arc::new(InMemoryStore::new());
        let mut transport = MockBotTransport::new();
        transport
            .expect_send_message()
            .withf(|_, text, _| text == CONTACT_THANKS)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let contact = TelegramContact {
            phone_number: "+15550100".into(),
            first_name: "Ana".into(),
            last_name: None,
            user_id: Some(42),
        };
        service(store.clone(), transport, None)
            .on_contact(&sender(), 4200, &contact)
            .await;

        let stored = store.latest_for_user(42).await.unwrap().unwrap();
        assert_eq!(stored.message_type, MessageType::Contact);
        assert_eq!(stored.content, "Phone: +15550100");
        assert!(store.get_by_user_id(42).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn text_is_stored_replied_and_mirrored_to_admin() {
        let store = Arc::new(InMemoryStore::new());
        let mut transport = MockBotTransport::new();
        transport
            .expect_send_message()
            .withf(|chat_id, text, _| *chat_id == 4200 && text == AUTO_REPLY)
            .times(1)
            .returning(|_, _, _| Ok(()));
        transport
            .expect_send_message()
            .withf(|chat_id, text, _| {
                *chat_id == 900
                    && text.contains("👤 From: Ana Lima (@ana)")
                    && text.contains("💬 Message: where is my order?")
                    && text.contains("🆔 Chat ID: 4200")
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        service(store.clone(), transport, Some(900))
            .on_text(&sender(), 4200, 77, "where is my order?")
            .await;

        let stored = store.latest_for_user(42).await.unwrap().unwrap();
        assert_eq!(stored.content, "where is my order?");
        assert_eq!(stored.sender_type, SenderType::User);
        assert_eq!(
            stored.metadata,
            MessageMetadata::Text {
                username: "ana".into(),
                first_name: Some("Ana".into()),
                last_name: Some("Lima".into()),
                message_id: 77,
            }
        );
    }

    #[tokio::test]
    async fn reply_still_sent_when_store_is_down() {
        let store = Arc::new(FailingStore);
        let mut transport = MockBotTransport::new();
        transport
            .expect_send_message()
            .withf(|_, text, _| text == AUTO_REPLY)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let bot = BotService::new(
            store.clone(),
            store,
            NotificationService::new(Arc::new(transport), None),
        );
        bot.on_text(&sender(), 4200, 1, "hello").await;
    }

    #[tokio::test]
    async fn user_recorded_when_message_store_fails() {
        let users = Arc::new(InMemoryStore::new());
        let mut transport = MockBotTransport::new();
        transport
            .expect_send_message()
            .withf(|chat_id, text, _| *chat_id == 4200 && text == AUTO_REPLY)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let bot = BotService::new(
            users.clone(),
            Arc::new(FailingStore),
            NotificationService::new(Arc::new(transport), None),
        );
        bot.on_text(&sender(), 4200, 1, "hello").await;

        let user = users.get_by_user_id(42).await.unwrap().unwrap();
        assert_eq!(user.chat_id, 4200);
        assert_eq!(user.username.as_deref(), Some("ana"));
        assert_eq!(users.message_count().await, 0);
    }

    #[tokio::test]
    async fn writes_stand_when_reply_fails() {
        let store = Arc::new(InMemoryStore::new());
        let mut transport = MockBotTransport::new();
        transport
            .expect_send_message()
            .returning(|_, _, _| Err(Error::Telegram("bot was blocked by the user".into())));

        service(store.clone(), transport, Some(900))
            .on_text(&sender(), 4200, 1, "hello")
            .await;

        assert_eq!(store.message_count().await, 1);
        assert!(store.get_by_user_id(42).await.unwrap().is_some());
    }
}
