// src/nav/state.rs
use crate::cid::CidPath;

/// Folder position under the root CID plus the "go up" stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub current_path: Vec<String>,
    pub path_history: Vec<Vec<String>>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh state for a query typed or opened from outside the folder view.
    pub fn from_query(query: &CidPath) -> Self {
        NavigationState { current_path: query.segments.clone(), path_history: Vec::new() }
    }

    pub fn path_string(&self) -> String {
        self.current_path.join("/")
    }

    pub fn is_root(&self) -> bool {
        self.current_path.is_empty()
    }

    pub fn navigate_to_folder(&mut self, name: &str) {
        self.path_history.push(self.current_path.clone());
        self.current_path.push(name.to_string());
    }

    /// Pops the history stack when it has entries, otherwise trims the last
    /// segment. Returns `false` when already at the root with no history.
    pub fn navigate_up(&mut self) -> bool {
        if let Some(previous) = self.path_history.pop() {
            self.current_path = previous;
            true
        } else if !self.current_path.is_empty() {
            self.current_path.pop();
            true
        } else {
            false
        }
    }

    /// Jumps to `path` and always clears the history stack.
    pub fn navigate_to_breadcrumb(&mut self, path: &str) {
        self.current_path = path
            .split('/')
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        self.path_history.clear();
    }
}
