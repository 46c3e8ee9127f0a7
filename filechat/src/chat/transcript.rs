//! Ordered chat log with a transient loading placeholder.

use crate::models::TranscriptEntry;

/// Handle to a loading placeholder returned by [`Transcript::insert_loading`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadingHandle(u64);

/// One visible row of the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptItem {
    /// A user or assistant message.
    Entry(TranscriptEntry),
    /// "Assistant is thinking" row, removed when its query settles.
    Loading(LoadingHandle),
}

/// The chat panel contents.
///
/// Starts in the empty state. The first `append` hides the empty-state
/// placeholder; only `reset` brings it back.
#[derive(Debug, Clone)]
pub struct Transcript {
    items: Vec<TranscriptItem>,
    empty_state: bool,
    next_handle: u64,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            empty_state: true,
            next_handle: 0,
        }
    }

    /// Append an entry at the end of the log.
    pub fn append(&mut self, entry: TranscriptEntry) {
        self.empty_state = false;
        self.items.push(TranscriptItem::Entry(entry));
    }

    /// Append a loading placeholder and return its handle.
    pub fn insert_loading(&mut self) -> LoadingHandle {
        let handle = LoadingHandle(self.next_handle);
        self.next_handle += 1;
        self.items.push(TranscriptItem::Loading(handle));
        handle
    }

    /// Remove the placeholder for `handle`. Returns false if it was already gone.
    pub fn remove(&mut self, handle: LoadingHandle) -> bool {
        let Some(pos) = self
            .items
            .iter()
            .position(|item| matches!(item, TranscriptItem::Loading(h) if *h == handle))
        else {
            return false;
        };
        self.items.remove(pos);
        true
    }

    /// Drop everything and show the empty-state placeholder again.
    pub fn reset(&mut self) {
        self.items.clear();
        self.empty_state = true;
    }

    /// Whether the empty-state placeholder is currently shown.
    pub const fn shows_empty_state(&self) -> bool {
        self.empty_state
    }

    pub fn items(&self) -> &[TranscriptItem] {
        &self.items
    }

    /// Message entries in order, skipping placeholders.
    pub fn entries(&self) -> impl Iterator<Item = &TranscriptEntry> {
        self.items.iter().filter_map(|item| match item {
            TranscriptItem::Entry(entry) => Some(entry),
            TranscriptItem::Loading(_) => None,
        })
    }

    pub fn is_loading(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, TranscriptItem::Loading(_)))
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
