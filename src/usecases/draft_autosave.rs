//! Use case for flushing debounced draft edits to persistent storage.

use std::time::{Duration, Instant};

use crate::domain::draft::{DraftBuffer, DraftOutcome};

/// Storage for per-channel drafts.
pub trait DraftStore {
    fn save_draft(&self, channel_id: &str, content: &str, quoted_message_id: Option<i64>);

    fn delete_draft(&self, channel_id: &str);
}

impl<T: DraftStore + ?Sized> DraftStore for &T {
    fn save_draft(&self, channel_id: &str, content: &str, quoted_message_id: Option<i64>) {
        (*self).save_draft(channel_id, content, quoted_message_id)
    }

    fn delete_draft(&self, channel_id: &str) {
        (*self).delete_draft(channel_id)
    }
}

/// Flushes the outcome the buffer owes at `now`, if any. Returns whether a
/// store call was made.
pub fn flush_due_draft(
    store: &dyn DraftStore,
    channel_id: &str,
    draft: &mut DraftBuffer,
    now: Instant,
    idle_window: Duration,
) -> bool {
    match draft.take_due(now, idle_window) {
        Some(DraftOutcome::Save {
            content,
            quoted_message_id,
        }) => {
            store.save_draft(channel_id, &content, quoted_message_id);
            true
        }
        Some(DraftOutcome::Delete) => {
            store.delete_draft(channel_id);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct StubStore {
        saves: RefCell<Vec<(String, String, Option<i64>)>>,
        deletes: RefCell<Vec<String>>,
    }

    impl DraftStore for StubStore {
        fn save_draft(&self, channel_id: &str, content: &str, quoted_message_id: Option<i64>) {
            self.saves.borrow_mut().push((
                channel_id.to_owned(),
                content.to_owned(),
                quoted_message_id,
            ));
        }

        fn delete_draft(&self, channel_id: &str) {
            self.deletes.borrow_mut().push(channel_id.to_owned());
        }
    }

    const IDLE: Duration = Duration::from_secs(1);

    #[test]
    fn idle_draft_is_saved_once() {
        let store = StubStore::default();
        let mut draft = DraftBuffer::new();
        let start = Instant::now();
        draft.edit("hello", start);

        assert!(flush_due_draft(&store, "3", &mut draft, start + IDLE, IDLE));
        assert!(!flush_due_draft(
            &store,
            "3",
            &mut draft,
            start + IDLE + IDLE,
            IDLE
        ));

        assert_eq!(
            *store.saves.borrow(),
            vec![("3".to_owned(), "hello".to_owned(), None)]
        );
    }

    #[test]
    fn flush_before_idle_window_does_nothing() {
        let store = StubStore::default();
        let mut draft = DraftBuffer::new();
        let start = Instant::now();
        draft.edit("hello", start);

        assert!(!flush_due_draft(
            &store,
            "3",
            &mut draft,
            start + Duration::from_millis(500),
            IDLE
        ));
        assert!(store.saves.borrow().is_empty());
    }

    #[test]
    fn emptied_saved_draft_flushes_a_delete() {
        let store = StubStore::default();
        let mut draft = DraftBuffer::restore("hello".to_owned(), None);
        let start = Instant::now();
        draft.edit("", start);

        assert!(flush_due_draft(&store, "3", &mut draft, start + IDLE, IDLE));

        assert!(store.saves.borrow().is_empty());
        assert_eq!(*store.deletes.borrow(), vec!["3".to_owned()]);
    }
}
