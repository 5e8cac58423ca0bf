use std::ops::Range;

use serde::Deserialize;

/// A story or a comment as returned by the `item/{id}.json` endpoint.
///
/// `children` is never part of the payload. It is filled by the fetch layer with the
/// accepted replies when this item becomes the active topic.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Item {
    pub id: u32,
    pub by: Option<String>,
    pub time: Option<i64>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub url: Option<String>,
    pub score: Option<u32>,
    #[serde(default)]
    pub kids: Vec<u32>,
    #[serde(skip)]
    pub children: Vec<Item>,
}

impl Item {
    pub fn author(&self) -> &str {
        self.by.as_deref().unwrap_or("")
    }

    pub fn raw_text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// URL of the item, treating an empty string the same as a missing one.
    pub fn link(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }
}

/// One slot of the top-level listing.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuEntry {
    /// Known only by id, pending enrichment.
    Stub(u32),
    Loaded(Item),
}

impl MenuEntry {
    pub fn id(&self) -> u32 {
        match self {
            Self::Stub(id) => *id,
            Self::Loaded(item) => item.id,
        }
    }

    pub fn item(&self) -> Option<&Item> {
        match self {
            Self::Stub(_) => None,
            Self::Loaded(item) => Some(item),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Snapshot of the ranked top-stories listing.
///
/// Built once per refresh from the id list; entries are upgraded from stubs to full
/// items page by page as the user pages through it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TopMenu {
    entries: Vec<MenuEntry>,
}

impl TopMenu {
    pub fn from_ids(ids: impl IntoIterator<Item = u32>) -> Self {
        Self {
            entries: ids.into_iter().map(MenuEntry::Stub).collect(),
        }
    }

    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            entries: items.into_iter().map(MenuEntry::Loaded).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MenuEntry> {
        self.entries.get(index)
    }

    /// Entries shown on `page` (1-indexed) for the given page size.
    pub fn window(&self, page: usize, page_size: usize) -> &[MenuEntry] {
        &self.entries[page_window(page, page_size, self.entries.len())]
    }

    /// Absolute index and id of every stub on `page` that still needs fetching.
    pub fn missing_in_window(&self, page: usize, page_size: usize) -> Vec<(usize, u32)> {
        let range = page_window(page, page_size, self.entries.len());
        let start = range.start;
        self.entries[range]
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.is_loaded())
            .map(|(offset, entry)| (start + offset, entry.id()))
            .collect()
    }

    pub fn is_window_loaded(&self, page: usize, page_size: usize) -> bool {
        self.window(page, page_size).iter().all(MenuEntry::is_loaded)
    }

    /// Replace the slot at `index` with a fetched item. Out-of-range indices are ignored.
    pub fn fill(&mut self, index: usize, item: Item) {
        if let Some(slot) = self.entries.get_mut(index) {
            *slot = MenuEntry::Loaded(item);
        }
    }
}

/// Index range of `page` (1-indexed) over a listing of `len` entries.
///
/// Equals `[(page-1)*page_size, min(page*page_size, len))`, clamped so that pages past
/// the end yield an empty range instead of panicking.
pub fn page_window(page: usize, page_size: usize, len: usize) -> Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(page_size).min(len);
    let end = page.saturating_mul(page_size).min(len);
    start..end
}
