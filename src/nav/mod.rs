// src/nav/mod.rs
pub mod breadcrumb;
pub mod controller;
pub mod state;

pub use breadcrumb::{build_breadcrumbs, Breadcrumb};
pub use controller::{NavAction, Navigation, Navigator};
pub use state::NavigationState;
