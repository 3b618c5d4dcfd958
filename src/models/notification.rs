use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub subject: String,
    pub message: String,
    // unix seconds
    pub at: i64,
}

impl Notification {
    pub fn new(subject: &str, message: &str) -> Self {
        Self {
            subject: subject.to_string(),
            message: message.to_string(),
            at: chrono::Utc::now().timestamp(),
        }
    }

    /// `"{subject}: {message}"`, the form shown to the user.
    pub fn text(&self) -> String {
        format!("{}: {}", self.subject, self.message)
    }
}
