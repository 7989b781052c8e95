// src/listing/view.rs
use super::{DirectoryEntry, FolderStats, SortBy, SortOrder};
use std::cmp::Ordering;

/// User-driven filter and sort settings for a folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingQuery {
    pub search: String,
    pub show_hidden: bool,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl ListingQuery {
    /// Filter then sort into a new sequence; `entries` is left untouched.
    pub fn apply(&self, entries: &[DirectoryEntry]) -> Vec<DirectoryEntry> {
        let needle = self.search.to_lowercase();
        let mut visible: Vec<DirectoryEntry> = entries
            .iter()
            .filter(|e| self.show_hidden || !e.is_hidden())
            .filter(|e| needle.is_empty() || e.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        visible.sort_by(|a, b| self.compare(a, b));
        visible
    }

    pub fn compare(&self, a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
        // Directories lead for every key but type, in both orders.
        if self.sort_by != SortBy::Type {
            match (a.is_dir, b.is_dir) {
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                _ => {}
            }
        }

        let ord = match self.sort_by {
            SortBy::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortBy::Size => a.size_bytes.cmp(&b.size_bytes),
            SortBy::Date => a.sort_timestamp().cmp(&b.sort_timestamp()),
            SortBy::Type => a.category().label().cmp(b.category().label()),
        };

        match self.sort_order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    }
}

/// Listing of the current folder plus the derived visible rows.
pub struct ListingView {
    pub entries: Vec<DirectoryEntry>,
    pub query: ListingQuery,
    visible: Vec<DirectoryEntry>,
}

impl ListingView {
    pub fn new(query: ListingQuery) -> Self {
        ListingView { entries: Vec::new(), query, visible: Vec::new() }
    }

    pub fn set_entries(&mut self, entries: Vec<DirectoryEntry>) {
        self.entries = entries;
        self.refresh();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.visible.clear();
    }

    pub fn refresh(&mut self) {
        self.visible = self.query.apply(&self.entries);
    }

    pub fn visible(&self) -> &[DirectoryEntry] {
        &self.visible
    }

    pub fn stats(&self) -> Option<FolderStats> {
        FolderStats::summarize(&self.entries)
    }

    pub fn search(&mut self, term: &str) {
        self.query.search = term.to_string();
        self.refresh();
    }

    pub fn toggle_hidden(&mut self) {
        self.query.show_hidden = !self.query.show_hidden;
        self.refresh();
    }

    pub fn set_sort(&mut self, sort_by: SortBy) {
        self.query.sort_by = sort_by;
        self.refresh();
    }

    pub fn cycle_sort(&mut self) {
        self.set_sort(self.query.sort_by.next());
    }

    pub fn toggle_order(&mut self) {
        self.query.sort_order = self.query.sort_order.toggle();
        self.refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn build(raw: &[Value]) -> Vec<DirectoryEntry> {
        raw.iter().map(|r| DirectoryEntry::from_raw(r, "QmRoot")).collect()
    }

    fn names(entries: &[DirectoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    fn sample() -> Vec<DirectoryEntry> {
        build(&[
            json!({"name": "zeta.mp4", "size": 500, "modified": "2024-01-03T00:00:00Z"}),
            json!({"name": "Alpha", "is_directory": true, "modified": "2024-01-01T00:00:00Z"}),
            json!({"name": "beta.txt", "size": 20, "modified": "2024-01-05T00:00:00Z"}),
            json!({"name": ".hidden", "size": 5}),
            json!({"name": "gamma", "is_directory": true, "modified": "2024-01-09T00:00:00Z"}),
            json!({"name": "Delta.PNG", "size": 900, "modified": "2024-01-02T00:00:00Z"}),
        ])
    }

    #[test]
    fn test_scenario_hidden_excluded_and_dirs_first() {
        let entries = build(&[
            json!({"name": ".git", "is_directory": true}),
            json!({"name": "readme.txt", "size": 120}),
            json!({"name": "Photos", "is_directory": true, "item_count": 3}),
        ]);
        let out = ListingQuery::default().apply(&entries);
        assert_eq!(names(&out), vec!["Photos", "readme.txt"]);
    }

    #[test]
    fn test_name_desc_reverses_within_buckets_only() {
        let entries = sample();
        let asc = ListingQuery::default().apply(&entries);
        let desc = ListingQuery { sort_order: SortOrder::Descending, ..Default::default() }.apply(&entries);

        assert_eq!(names(&asc), vec!["Alpha", "gamma", "beta.txt", "Delta.PNG", "zeta.mp4"]);
        assert_eq!(names(&desc), vec!["gamma", "Alpha", "zeta.mp4", "Delta.PNG", "beta.txt"]);

        let split = |v: &[DirectoryEntry]| -> (Vec<String>, Vec<String>) {
            let dirs = v.iter().filter(|e| e.is_dir).map(|e| e.name.clone()).collect();
            let files = v.iter().filter(|e| !e.is_dir).map(|e| e.name.clone()).collect();
            (dirs, files)
        };
        let (asc_dirs, asc_files) = split(&asc);
        let (mut desc_dirs, mut desc_files) = split(&desc);
        desc_dirs.reverse();
        desc_files.reverse();
        assert_eq!(asc_dirs, desc_dirs);
        assert_eq!(asc_files, desc_files);
    }

    #[test]
    fn test_hidden_toggle_removes_only_dotfiles() {
        let entries = sample();
        let shown = ListingQuery { show_hidden: true, ..Default::default() }.apply(&entries);
        let hidden = ListingQuery::default().apply(&entries);
        assert_eq!(shown.len(), entries.len());
        let removed: Vec<&DirectoryEntry> = shown.iter().filter(|e| !hidden.contains(e)).collect();
        assert_eq!(removed.len(), 1);
        assert!(removed.iter().all(|e| e.name.starts_with('.')));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let entries = sample();
        let out = ListingQuery { search: "ELT".to_string(), ..Default::default() }.apply(&entries);
        assert_eq!(names(&out), vec!["Delta.PNG"]);
        let out = ListingQuery { search: "a".to_string(), ..Default::default() }.apply(&entries);
        assert!(out.iter().all(|e| e.name.to_lowercase().contains('a')));
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn test_size_sort_keeps_dirs_first() {
        let query = ListingQuery { sort_by: SortBy::Size, sort_order: SortOrder::Descending, ..Default::default() };
        let out = query.apply(&sample());
        assert_eq!(names(&out), vec!["Alpha", "gamma", "Delta.PNG", "zeta.mp4", "beta.txt"]);
    }

    #[test]
    fn test_date_sort() {
        let query = ListingQuery { sort_by: SortBy::Date, ..Default::default() };
        let out = query.apply(&sample());
        assert_eq!(names(&out), vec!["Alpha", "gamma", "Delta.PNG", "zeta.mp4", "beta.txt"]);
    }

    #[test]
    fn test_type_sort_groups_by_category_without_dir_rule() {
        let query = ListingQuery { sort_by: SortBy::Type, ..Default::default() };
        let out = query.apply(&sample());
        let labels: Vec<&str> = out.iter().map(|e| e.category().label()).collect();
        assert_eq!(labels, vec!["folder", "folder", "image", "text", "video"]);
    }

    #[test]
    fn test_apply_does_not_mutate_input() {
        let entries = sample();
        let before = entries.clone();
        let _ = ListingQuery { sort_order: SortOrder::Descending, ..Default::default() }.apply(&entries);
        assert_eq!(entries, before);
    }

    #[test]
    fn test_view_controls() {
        let mut view = ListingView::new(ListingQuery::default());
        view.set_entries(sample());
        assert_eq!(view.visible().len(), 5);
        view.toggle_hidden();
        assert_eq!(view.visible().len(), 6);
        view.search("zeta");
        assert_eq!(names(view.visible()), vec!["zeta.mp4"]);
        view.search("");
        view.cycle_sort();
        assert_eq!(view.query.sort_by, SortBy::Size);
        view.toggle_order();
        assert_eq!(view.query.sort_order, SortOrder::Descending);
        assert_eq!(view.stats().map(|s| s.total_count), Some(6));
        view.clear();
        assert!(view.visible().is_empty());
        assert!(view.stats().is_none());
    }
}
