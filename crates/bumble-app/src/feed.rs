//! Feed / swipe state machine.

use bumble_core::{Account, ImageItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    /// Nothing to show.
    Empty,
    Browsing { cursor: usize },
    /// Every item has been passed; terminal until the feed is reloaded.
    Exhausted,
}

/// The other account's items plus a cursor in `[0, len]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    owner: Option<Account>,
    items: Vec<ImageItem>,
    cursor: usize,
}

impl Feed {
    pub fn new(owner: Account, items: Vec<ImageItem>) -> Self {
        Feed {
            owner: Some(owner),
            items,
            cursor: 0,
        }
    }

    pub fn empty() -> Self {
        Feed::default()
    }

    /// Account whose images this feed shows.
    pub fn owner(&self) -> Option<Account> {
        self.owner
    }

    pub fn items(&self) -> &[ImageItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> FeedState {
        if self.items.is_empty() {
            FeedState::Empty
        } else if self.cursor >= self.items.len() {
            FeedState::Exhausted
        } else {
            FeedState::Browsing {
                cursor: self.cursor,
            }
        }
    }

    pub fn current(&self) -> Option<&ImageItem> {
        self.items.get(self.cursor)
    }

    /// Move past the current item. A no-op once exhausted.
    pub fn advance(&mut self) -> FeedState {
        self.cursor = (self.cursor + 1).min(self.items.len());
        self.state()
    }
}
