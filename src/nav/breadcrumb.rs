// src/nav/breadcrumb.rs
use crate::cid::decode_segment;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub name: String,
    /// Cumulative path from the root, `""` for the root crumb.
    pub path: String,
    pub is_root: bool,
}

impl Breadcrumb {
    fn root() -> Self {
        Breadcrumb { name: "Root".to_string(), path: String::new(), is_root: true }
    }
}

pub fn build_breadcrumbs<S: AsRef<str>>(current_path: &[S]) -> Vec<Breadcrumb> {
    let mut crumbs = vec![Breadcrumb::root()];
    let mut cumulative = String::new();
    for part in current_path.iter().map(AsRef::as_ref).filter(|p| !p.is_empty()) {
        if !cumulative.is_empty() {
            cumulative.push('/');
        }
        cumulative.push_str(part);
        crumbs.push(Breadcrumb {
            name: decode_segment(part),
            path: cumulative.clone(),
            is_root: false,
        });
    }
    crumbs
}
