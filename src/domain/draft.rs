use std::time::{Duration, Instant};

/// Persistence work owed for a draft once its debounce window elapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftOutcome {
    Save {
        content: String,
        quoted_message_id: Option<i64>,
    },
    Delete,
}

/// Locally buffered composition text for one channel.
///
/// Edits are debounce-persisted: each keystroke supersedes the previous
/// pending save, and only an idle window produces an outcome. An emptied
/// draft that was previously saved owes a delete instead.
#[derive(Debug, Default)]
pub struct DraftBuffer {
    content: String,
    quoted_message_id: Option<i64>,
    last_edit: Option<Instant>,
    last_saved_content: String,
}

impl DraftBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a draft previously fetched from the server.
    pub fn restore(content: String, quoted_message_id: Option<i64>) -> Self {
        Self {
            last_saved_content: content.clone(),
            content,
            quoted_message_id,
            last_edit: None,
        }
    }

    pub fn edit(&mut self, content: impl Into<String>, now: Instant) {
        self.content = content.into();
        self.last_edit = Some(now);
    }

    pub fn quote(&mut self, message_id: Option<i64>, now: Instant) {
        self.quoted_message_id = message_id;
        self.last_edit = Some(now);
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn quoted_message_id(&self) -> Option<i64> {
        self.quoted_message_id
    }

    /// Returns the persistence outcome owed at `now`, if the idle window has
    /// elapsed since the last edit. Consuming the outcome arms nothing new;
    /// the next edit does.
    pub fn take_due(&mut self, now: Instant, idle_window: Duration) -> Option<DraftOutcome> {
        let last_edit = self.last_edit?;
        if now.duration_since(last_edit) < idle_window {
            return None;
        }
        self.last_edit = None;

        let trimmed = self.content.trim();
        if trimmed.is_empty() {
            if self.last_saved_content.is_empty() {
                return None;
            }
            self.last_saved_content.clear();
            self.quoted_message_id = None;
            return Some(DraftOutcome::Delete);
        }

        if trimmed == self.last_saved_content {
            return None;
        }

        self.last_saved_content = trimmed.to_owned();
        Some(DraftOutcome::Save {
            content: trimmed.to_owned(),
            quoted_message_id: self.quoted_message_id,
        })
    }

    /// Clears the buffer after the message is sent; the stored draft owes a
    /// delete if one was ever saved.
    pub fn clear_on_send(&mut self, now: Instant) {
        self.content.clear();
        self.quoted_message_id = None;
        self.last_edit = Some(now);
    }
}
