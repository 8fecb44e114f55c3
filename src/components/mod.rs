mod status_message;
mod toolbar;

pub use status_message::StatusMessage;
pub use toolbar::HistoryToolbar;
