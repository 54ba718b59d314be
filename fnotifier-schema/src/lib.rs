pub mod sheets;
pub mod telegram;

pub use sheets::{
    AppendValuesResponse, INSERT_DATA_OPTION_INSERT_ROWS, UpdateValuesResponse,
    VALUE_INPUT_OPTION_RAW, ValueRange,
};
pub use telegram::{
    BotUser, Chat, GetUpdatesRequest, Message, SendMessageRequest, TelegramResponse, Update,
};
