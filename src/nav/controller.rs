// src/nav/controller.rs
use super::{build_breadcrumbs, Breadcrumb, NavigationState};
use crate::cid::{encode_query, join_query, CidPath};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    OpenEntry { name: String, is_dir: bool },
    Up,
    Breadcrumb(String),
    Search(String),
}

/// The composite identifier to load next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub query: String,
}

impl Navigation {
    /// Route form used when sharing a link to the current view.
    pub fn location(&self) -> String {
        format!("/search?q={}", encode_query(&self.query))
    }
}

/// Turns folder-view actions into exactly one navigation each.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    base: String,
    state: NavigationState,
}

impl Navigator {
    /// Start from a query typed by the user or opened from a side panel.
    pub fn open(query: &str) -> Self {
        let parsed = CidPath::parse(query);
        Navigator { state: NavigationState::from_query(&parsed), base: parsed.base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn current_query(&self) -> String {
        join_query(&self.base, &self.state.current_path)
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        build_breadcrumbs(&self.state.current_path)
    }

    pub fn apply(&mut self, action: NavAction) -> Option<Navigation> {
        match action {
            NavAction::OpenEntry { name, is_dir: true } => {
                self.state.navigate_to_folder(&name);
                Some(self.here())
            }
            NavAction::OpenEntry { name, is_dir: false } => {
                let mut segments = self.state.current_path.clone();
                segments.push(name);
                let query = join_query(&self.base, &segments);
                *self = Navigator::open(&query);
                Some(Navigation { query })
            }
            NavAction::Up => self.state.navigate_up().then(|| self.here()),
            NavAction::Breadcrumb(path) => {
                self.state.navigate_to_breadcrumb(&path);
                Some(self.here())
            }
            NavAction::Search(term) => {
                let term = term.trim();
                if term.is_empty() {
                    return None;
                }
                *self = Navigator::open(term);
                Some(Navigation { query: term.to_string() })
            }
        }
    }

    /// Shareable route for the folder currently shown.
    pub fn location(&self) -> String {
        self.here().location()
    }

    fn here(&self) -> Navigation {
        Navigation { query: self.current_query() }
    }
}
