/// Lệnh UI gửi xuống session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Raw input text; trimming happens in the session.
    SendMessage(String),
    /// Flip the detail panel of one peer card.
    ToggleCard(String),
    Disconnect,
}
