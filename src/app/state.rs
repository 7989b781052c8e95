// src/app/state.rs
use crate::analytics::{next_period, CID_DEFAULT_DAYS};
use crate::api::{AnalyticsDashboard, CidAnalytics, ExportKind, Metadata, RealtimeAnalytics};
use crate::config::Config;
use crate::library::{BookmarkChange, Library};
use crate::listing::ListingView;
use crate::nav::{NavAction, Navigator};
use crate::preview::{suggested_filename, validate_filename, PreviewContent};
use crate::session::Loaded;
use crate::utils::{format_number, format_size};

use super::event::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    History,
    Bookmarks,
    Uploads,
    Groups,
    Analytics,
    Trending,
}

impl Panel {
    pub const ALL: [Panel; 6] = [
        Panel::History,
        Panel::Bookmarks,
        Panel::Uploads,
        Panel::Groups,
        Panel::Analytics,
        Panel::Trending,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Panel::History => "History",
            Panel::Bookmarks => "Bookmarks",
            Panel::Uploads => "My Uploads",
            Panel::Groups => "Groups",
            Panel::Analytics => "Analytics",
            Panel::Trending => "Trending",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Listing,
    Side(Panel),
}

impl Focus {
    /// Tab order: listing, then each side panel, then back.
    pub fn next(self) -> Focus {
        match self {
            Focus::Listing => Focus::Side(Panel::History),
            Focus::Side(Panel::Trending) => Focus::Listing,
            Focus::Side(panel) => {
                let i = Panel::ALL.iter().position(|p| *p == panel).unwrap_or(0);
                Focus::Side(Panel::ALL[i + 1])
            }
        }
    }

    pub fn panel(self) -> Option<Panel> {
        match self {
            Focus::Listing => None,
            Focus::Side(panel) => Some(panel),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    OpenCid,
    Filter,
    SaveAs,
    NewGroup,
    RenameGroup(i64),
    AddCid(i64),
    GoToCrumb,
}

impl InputKind {
    pub fn prompt(self) -> &'static str {
        match self {
            InputKind::OpenCid => "Open CID",
            InputKind::Filter => "Search in folder",
            InputKind::SaveAs => "Save as",
            InputKind::NewGroup => "New group name",
            InputKind::RenameGroup(_) => "Rename group",
            InputKind::AddCid(_) => "Add CID to group",
            InputKind::GoToCrumb => "Go to breadcrumb",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub kind: InputKind,
    pub buffer: String,
}

/// Background work requested by a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    Load(String),
    Retry,
    RefreshLibrary,
    SendBookmark(BookmarkChange),
    DeleteHistory(String),
    DeleteBookmark(String),
    DeleteUpload(String),
    DeleteGroup(i64),
    RemoveFromGroup(i64, String),
    CreateGroup(String),
    RenameGroup(i64, String),
    AddToGroup(i64, String),
    Save { cid: String, filename: String },
    Dashboard(u32),
    Export(ExportKind, u32),
    CidAnalytics { cid: String, days: u32 },
}

/// A library row removed on the backend, applied locally once confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    History(String),
    Bookmark(String),
    Upload(String),
    Group(i64),
    GroupCid(i64, String),
}

/// Results reported by background jobs.
#[derive(Debug)]
pub enum AppEvent {
    Key(crossterm::event::KeyEvent),
    Resize,
    Loaded(Loaded),
    Library(Library),
    BookmarkSent(BookmarkChange),
    Removed(Removal),
    Dashboard(AnalyticsDashboard),
    Realtime(RealtimeAnalytics),
    CidAnalytics(CidAnalytics),
    Message(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideTarget {
    None,
    Cid(String),
    Group(i64),
    GroupCid(i64, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideItem {
    pub label: String,
    pub target: SideTarget,
}

impl SideItem {
    fn new(label: String, target: SideTarget) -> Self {
        SideItem { label, target }
    }

    pub fn cid(&self) -> Option<&str> {
        match &self.target {
            SideTarget::Cid(cid) | SideTarget::GroupCid(_, cid) => Some(cid),
            _ => None,
        }
    }
}

pub struct App {
    pub focus: Focus,
    pub input: Option<Input>,
    pub navigator: Navigator,
    pub listing: ListingView,
    pub selected: usize,
    pub side_selected: usize,
    pub library: Library,
    pub meta: Option<Metadata>,
    pub preview: Option<PreviewContent>,
    pub error: Option<String>,
    pub bookmarked: bool,
    pub loading: bool,
    pub status: Option<String>,
    pub dashboard: Option<AnalyticsDashboard>,
    pub realtime: Option<RealtimeAnalytics>,
    pub cid_analytics: Option<CidAnalytics>,
    pub period: u32,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: &Config) -> Self {
        App {
            focus: Focus::Listing,
            input: None,
            navigator: Navigator::default(),
            listing: ListingView::new(config.listing_query()),
            selected: 0,
            side_selected: 0,
            library: Library::default(),
            meta: None,
            preview: None,
            error: None,
            bookmarked: false,
            loading: false,
            status: None,
            dashboard: None,
            realtime: None,
            cid_analytics: None,
            period: config.analytics_days,
            should_quit: false,
        }
    }

    pub fn is_home(&self) -> bool {
        self.navigator.base().is_empty()
    }

    pub fn is_typing(&self) -> bool {
        self.input.is_some()
    }

    /// Realtime polling only runs while the analytics panel is focused.
    pub fn wants_realtime(&self) -> bool {
        self.focus == Focus::Side(Panel::Analytics)
    }

    pub fn current_query(&self) -> String {
        self.navigator.current_query()
    }

    /// Open a query typed by the user or passed on the command line.
    pub fn open(&mut self, query: &str) -> Vec<Job> {
        self.navigate(NavAction::Search(query.to_string()))
    }

    pub fn dispatch(&mut self, command: Command) -> Vec<Job> {
        match command {
            Command::Quit => {
                self.should_quit = true;
                Vec::new()
            }
            Command::StartInput(kind) => {
                self.start_input(kind);
                Vec::new()
            }
            Command::InputChar(c) => {
                self.edit_input(|buffer| buffer.push(c));
                Vec::new()
            }
            Command::InputBackspace => {
                self.edit_input(|buffer| {
                    buffer.pop();
                });
                Vec::new()
            }
            Command::InputCancel => {
                if let Some(Input { kind: InputKind::Filter, .. }) = self.input.take() {
                    self.listing.search("");
                    self.clamp_selection();
                }
                Vec::new()
            }
            Command::InputSubmit => self.submit_input(),
            Command::MoveUp => {
                self.move_selection(-1);
                Vec::new()
            }
            Command::MoveDown => {
                self.move_selection(1);
                Vec::new()
            }
            Command::Open => self.open_selected(),
            Command::Up if self.focus == Focus::Listing => self.navigate(NavAction::Up),
            Command::Breadcrumb(index) => {
                let path = self.navigator.breadcrumbs().get(index).map(|crumb| crumb.path.clone());
                match path {
                    Some(path) if !self.is_home() => self.navigate(NavAction::Breadcrumb(path)),
                    _ => Vec::new(),
                }
            }
            Command::CycleSort => {
                self.listing.cycle_sort();
                Vec::new()
            }
            Command::ToggleOrder => {
                self.listing.toggle_order();
                Vec::new()
            }
            Command::ToggleHidden => {
                self.listing.toggle_hidden();
                self.clamp_selection();
                Vec::new()
            }
            Command::ToggleBookmark => {
                if self.meta.is_none() {
                    return Vec::new();
                }
                let cid = self.current_query();
                vec![Job::SendBookmark(self.library.bookmark_change(&cid, self.meta.as_ref()))]
            }
            Command::Retry => {
                if self.is_home() {
                    return vec![Job::RefreshLibrary];
                }
                self.begin_load();
                vec![Job::Retry]
            }
            Command::CyclePanel => {
                self.focus = self.focus.next();
                self.side_selected = 0;
                if self.wants_realtime() {
                    vec![Job::Dashboard(self.period)]
                } else {
                    Vec::new()
                }
            }
            Command::Delete => self.delete_selected(),
            Command::Save => {
                if self.meta.as_ref().map(|m| !m.is_dir).unwrap_or(false) {
                    self.start_input(InputKind::SaveAs);
                }
                Vec::new()
            }
            Command::CyclePeriod if self.wants_realtime() => {
                self.period = next_period(self.period);
                vec![Job::Dashboard(self.period)]
            }
            Command::Export if self.wants_realtime() => [ExportKind::Views, ExportKind::Downloads, ExportKind::Traffic]
                .into_iter()
                .map(|kind| Job::Export(kind, self.period))
                .collect(),
            Command::CidStats if !self.is_home() => {
                vec![Job::CidAnalytics { cid: self.navigator.base().to_string(), days: CID_DEFAULT_DAYS }]
            }
            Command::NewGroup if self.focus == Focus::Side(Panel::Groups) => {
                self.start_input(InputKind::NewGroup);
                Vec::new()
            }
            Command::AddToGroup | Command::RenameGroup if self.focus == Focus::Side(Panel::Groups) => {
                let id = match self.selected_side().map(|item| item.target) {
                    Some(SideTarget::Group(id)) | Some(SideTarget::GroupCid(id, _)) => id,
                    _ => return Vec::new(),
                };
                let kind = if command == Command::RenameGroup { InputKind::RenameGroup(id) } else { InputKind::AddCid(id) };
                self.start_input(kind);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(_) | AppEvent::Resize => {}
            AppEvent::Loaded(loaded) => self.apply_loaded(loaded),
            AppEvent::Library(library) => {
                self.library = library;
                if self.meta.is_some() {
                    self.bookmarked = self.library.is_bookmarked(&self.current_query());
                }
                self.clamp_side_selection();
            }
            AppEvent::BookmarkSent(change) => {
                self.library.apply_bookmark_change(&change);
                self.bookmarked = matches!(change, BookmarkChange::Add(_));
                let message = if self.bookmarked { "Bookmark added" } else { "Bookmark removed" };
                self.status = Some(message.to_string());
            }
            AppEvent::Removed(removal) => {
                match removal {
                    Removal::History(cid) => self.library.remove_history(&cid),
                    Removal::Bookmark(cid) => {
                        self.library.remove_bookmark(&cid);
                        if cid == self.current_query() {
                            self.bookmarked = false;
                        }
                    }
                    Removal::Upload(cid) => self.library.remove_upload(&cid),
                    Removal::Group(id) => self.library.groups.retain(|g| g.id != id),
                    Removal::GroupCid(id, cid) => {
                        if let Some(mut group) = self.library.group(id).cloned() {
                            group.cids.retain(|c| c.cid != cid);
                            group.cid_count = group.cids.len();
                            self.library.replace_group(group);
                        }
                    }
                }
                self.clamp_side_selection();
            }
            AppEvent::Dashboard(dashboard) => self.dashboard = Some(dashboard),
            AppEvent::Realtime(realtime) => self.realtime = Some(realtime),
            AppEvent::CidAnalytics(analytics) => self.cid_analytics = Some(analytics),
            AppEvent::Message(message) => self.status = Some(message),
        }
    }

    fn navigate(&mut self, action: NavAction) -> Vec<Job> {
        match self.navigator.apply(action) {
            Some(navigation) => {
                self.begin_load();
                vec![Job::Load(navigation.query)]
            }
            None => Vec::new(),
        }
    }

    fn begin_load(&mut self) {
        self.loading = true;
        self.listing.clear();
        self.meta = None;
        self.preview = None;
        self.error = None;
        self.bookmarked = false;
        self.cid_analytics = None;
        self.selected = 0;
        self.focus = Focus::Listing;
    }

    fn apply_loaded(&mut self, loaded: Loaded) {
        self.loading = false;
        self.preview = loaded.preview;
        self.error = loaded.error;
        if let Some(history) = loaded.history {
            self.library.history = history;
        }
        self.bookmarked = loaded.bookmarked || self.library.is_bookmarked(&loaded.query);
        self.listing.set_entries(loaded.entries);
        self.meta = loaded.meta;
        self.selected = 0;
    }

    fn start_input(&mut self, kind: InputKind) {
        let buffer = match kind {
            InputKind::Filter => self.listing.query.search.clone(),
            InputKind::SaveAs => {
                let ext_source = self.meta.as_ref().map(|m| m.content_type.as_str());
                suggested_filename(self.navigator.base(), ext_source)
            }
            InputKind::RenameGroup(id) => self
                .library
                .groups
                .iter()
                .find(|g| g.id == id)
                .map(|g| g.name.clone())
                .unwrap_or_default(),
            _ => String::new(),
        };
        self.input = Some(Input { kind, buffer });
    }

    fn edit_input(&mut self, edit: impl FnOnce(&mut String)) {
        let Some(input) = self.input.as_mut() else {
            return;
        };
        edit(&mut input.buffer);
        if input.kind == InputKind::Filter {
            let term = input.buffer.clone();
            self.listing.search(&term);
            self.clamp_selection();
        }
    }

    fn submit_input(&mut self) -> Vec<Job> {
        let Some(Input { kind, buffer }) = self.input.take() else {
            return Vec::new();
        };
        match kind {
            InputKind::OpenCid => self.open(&buffer),
            InputKind::Filter => Vec::new(),
            InputKind::SaveAs => match validate_filename(&buffer) {
                Ok(filename) => vec![Job::Save { cid: self.current_query(), filename }],
                Err(e) => {
                    self.status = Some(e.to_string());
                    Vec::new()
                }
            },
            InputKind::NewGroup => vec![Job::CreateGroup(buffer)],
            InputKind::RenameGroup(id) => vec![Job::RenameGroup(id, buffer)],
            InputKind::AddCid(id) => vec![Job::AddToGroup(id, buffer)],
            InputKind::GoToCrumb => match buffer.trim().parse::<usize>() {
                Ok(index) => self.dispatch(Command::Breadcrumb(index)),
                Err(_) => {
                    self.status = Some("Enter a breadcrumb number".to_string());
                    Vec::new()
                }
            },
        }
    }

    fn open_selected(&mut self) -> Vec<Job> {
        match self.focus {
            Focus::Listing => {
                let Some(entry) = self.listing.visible().get(self.selected) else {
                    return Vec::new();
                };
                let action = NavAction::OpenEntry { name: entry.name.clone(), is_dir: entry.is_dir };
                self.navigate(action)
            }
            Focus::Side(_) => match self.selected_side().and_then(|item| item.cid().map(str::to_string)) {
                Some(cid) => self.open(&cid),
                None => Vec::new(),
            },
        }
    }

    fn delete_selected(&mut self) -> Vec<Job> {
        let Some(panel) = self.focus.panel() else {
            return Vec::new();
        };
        let Some(item) = self.selected_side() else {
            return Vec::new();
        };
        let job = match (panel, item.target) {
            (Panel::History, SideTarget::Cid(cid)) => Job::DeleteHistory(cid),
            (Panel::Bookmarks, SideTarget::Cid(cid)) => Job::DeleteBookmark(cid),
            (Panel::Uploads, SideTarget::Cid(cid)) => Job::DeleteUpload(cid),
            (Panel::Groups, SideTarget::Group(id)) => Job::DeleteGroup(id),
            (Panel::Groups, SideTarget::GroupCid(id, cid)) => Job::RemoveFromGroup(id, cid),
            _ => return Vec::new(),
        };
        vec![job]
    }

    fn move_selection(&mut self, delta: isize) {
        let (index, len) = match self.focus {
            Focus::Listing => (&mut self.selected, self.listing.visible().len()),
            Focus::Side(panel) => {
                let len = self.side_items(panel).len();
                (&mut self.side_selected, len)
            }
        };
        if len == 0 {
            *index = 0;
            return;
        }
        *index = (*index as isize + delta).clamp(0, len as isize - 1) as usize;
    }

    fn clamp_selection(&mut self) {
        let len = self.listing.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn clamp_side_selection(&mut self) {
        if let Some(panel) = self.focus.panel() {
            let len = self.side_items(panel).len();
            self.side_selected = self.side_selected.min(len.saturating_sub(1));
        }
    }

    pub fn selected_side(&self) -> Option<SideItem> {
        let panel = self.focus.panel()?;
        self.side_items(panel).into_iter().nth(self.side_selected)
    }

    pub fn side_items(&self, panel: Panel) -> Vec<SideItem> {
        let lib = &self.library;
        match panel {
            Panel::History => lib
                .history
                .iter()
                .map(|h| {
                    let when = h.timestamp.as_deref().map(short_time).unwrap_or_default();
                    SideItem::new(format!("{} {}", h.cid, when).trim_end().to_string(), SideTarget::Cid(h.cid.clone()))
                })
                .collect(),
            Panel::Bookmarks => lib
                .bookmarks
                .iter()
                .map(|b| {
                    let size = b.size_human.clone().unwrap_or_else(|| format_size(b.size));
                    SideItem::new(format!("{} ({})", b.title, size), SideTarget::Cid(b.cid.clone()))
                })
                .collect(),
            Panel::Uploads => lib
                .uploads
                .iter()
                .map(|u| {
                    let size = u.size_human.clone().unwrap_or_else(|| format_size(u.file_size));
                    SideItem::new(format!("{} [{}] {}", u.file_name, u.visibility, size), SideTarget::Cid(u.cid.clone()))
                })
                .collect(),
            Panel::Groups => {
                let mut items = Vec::new();
                for group in &lib.groups {
                    items.push(SideItem::new(format!("▸ {} ({})", group.name, group.cid_count), SideTarget::Group(group.id)));
                    for c in &group.cids {
                        let label = if c.file_name.is_empty() { c.cid.clone() } else { c.file_name.clone() };
                        items.push(SideItem::new(format!("   {}", label), SideTarget::GroupCid(group.id, c.cid.clone())));
                    }
                }
                items
            }
            Panel::Analytics => self.analytics_items(),
            Panel::Trending => lib
                .trending
                .iter()
                .map(|t| SideItem::new(t.cid.clone(), SideTarget::Cid(t.cid.clone())))
                .collect(),
        }
    }

    fn analytics_items(&self) -> Vec<SideItem> {
        let mut items = Vec::new();
        if let Some(rt) = &self.realtime {
            items.push(SideItem::new(
                format!(
                    "Live: {} views, {} downloads, {} sessions",
                    format_number(rt.recent_views),
                    format_number(rt.recent_downloads),
                    format_number(rt.active_sessions)
                ),
                SideTarget::None,
            ));
        }
        if let Some(dash) = &self.dashboard {
            items.push(SideItem::new(
                format!(
                    "{} days: {} views, {} downloads, {} CIDs",
                    dash.period_days,
                    format_number(dash.totals.views),
                    format_number(dash.totals.downloads),
                    format_number(dash.totals.unique_cids)
                ),
                SideTarget::None,
            ));
            for ranked in &dash.top_viewed {
                let name = ranked.filename.clone().unwrap_or_else(|| ranked.cid.clone());
                items.push(SideItem::new(
                    format!("  {} {}", format_number(ranked.count), name),
                    SideTarget::Cid(ranked.cid.clone()),
                ));
            }
            for source in &dash.traffic_sources {
                items.push(SideItem::new(format!("  {} via {}", format_number(source.count), source.label), SideTarget::None));
            }
        }
        items
    }
}

fn short_time(timestamp: &str) -> String {
    crate::listing::entry::parse_timestamp(timestamp)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
