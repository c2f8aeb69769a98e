// SPDX-License-Identifier: MPL-2.0

//! Client-side search over already loaded lists.

use crate::model::{Announcement, AnnouncementCategory, UserProfile};

/// Text an item can be found by.
pub trait Searchable {
    fn haystacks(&self) -> Vec<&str>;
}

impl Searchable for Announcement {
    fn haystacks(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.content.as_str()]
    }
}

impl Searchable for UserProfile {
    fn haystacks(&self) -> Vec<&str> {
        vec![
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.username(),
        ]
    }
}

pub fn matches<T: Searchable + ?Sized>(item: &T, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    needle.is_empty()
        || item
            .haystacks()
            .iter()
            .any(|h| h.to_lowercase().contains(&needle))
}

/// Items matching `query`, case-insensitively. A blank query keeps all.
pub fn filter<'a, T: Searchable>(items: &'a [T], query: &str) -> Vec<&'a T> {
    items.iter().filter(|item| matches(*item, query)).collect()
}

/// Category tab selection on the announcements page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(AnnouncementCategory),
}

impl CategoryFilter {
    pub fn parse(value: &str) -> Option<Self> {
        if value == "all" {
            Some(CategoryFilter::All)
        } else {
            AnnouncementCategory::parse(value).map(CategoryFilter::Only)
        }
    }

    pub fn accepts(self, category: AnnouncementCategory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => c == category,
        }
    }
}

pub fn filter_announcements<'a>(
    items: &'a [Announcement],
    query: &str,
    category: CategoryFilter,
) -> Vec<&'a Announcement> {
    items
        .iter()
        .filter(|a| category.accepts(a.category) && matches(*a, query))
        .collect()
}

/// What a filtered list should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState<T> {
    Loading,
    /// Nothing exists yet.
    Empty,
    /// Items exist but none match the filter.
    NoResults,
    Items(Vec<T>),
}

impl<T> ListState<T> {
    pub fn classify(is_loading: bool, total: usize, filtered: Vec<T>) -> Self {
        if is_loading {
            ListState::Loading
        } else if total == 0 {
            ListState::Empty
        } else if filtered.is_empty() {
            ListState::NoResults
        } else {
            ListState::Items(filtered)
        }
    }
}
