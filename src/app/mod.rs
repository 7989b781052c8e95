// src/app/mod.rs
pub mod event;
pub mod state;
pub mod ui;

pub use state::{App, AppEvent, Focus, InputKind, Job, Panel, Removal};

use crate::analytics::{cid_analytics, export_csv, RealtimePoller};
use crate::api::Backend;
use crate::config::Config;
use crate::library::{add_cid_to_group, create_group, rename_group, Library};
use crate::session::Session;
use crossterm::event::Event as TermEvent;
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::Stdout;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedSender};

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Run the browser until the user quits. `initial` is opened right away when given.
pub async fn run(config: &Config, backend: Arc<dyn Backend>, initial: Option<String>) -> crate::Result<()> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = event_loop(&mut terminal, config, backend, initial).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

async fn event_loop(terminal: &mut Term, config: &Config, backend: Arc<dyn Backend>, initial: Option<String>) -> crate::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_input_reader(tx.clone());

    let session = Arc::new(Session::new(backend));
    let mut app = App::new(config);
    let mut poller: Option<RealtimePoller> = None;

    spawn_job(Job::RefreshLibrary, &app, &session, &tx);
    if let Some(query) = initial {
        for job in app.open(&query) {
            spawn_job(job, &app, &session, &tx);
        }
    }

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        let Some(received) = rx.recv().await else {
            break;
        };
        let jobs = match received {
            AppEvent::Key(key) => match event::map_key(key, app.is_typing()) {
                Some(command) => app.dispatch(command),
                None => Vec::new(),
            },
            AppEvent::Loaded(loaded) if !session.is_current(loaded.generation) => {
                log::debug!("dropping stale result for {}", loaded.query);
                Vec::new()
            }
            other => {
                app.apply(other);
                Vec::new()
            }
        };
        for job in jobs {
            spawn_job(job, &app, &session, &tx);
        }
        if app.should_quit {
            break;
        }

        // A poller task that has exited is replaced.
        let polling = poller.as_ref().is_some_and(RealtimePoller::is_running);
        match (app.wants_realtime(), polling) {
            (true, false) => {
                poller = Some(RealtimePoller::start(
                    session.backend(),
                    config.realtime_interval(),
                    tx.clone(),
                    AppEvent::Realtime,
                ));
            }
            (false, _) => poller = None,
            _ => {}
        }
    }
    Ok(())
}

fn spawn_input_reader(tx: UnboundedSender<AppEvent>) {
    std::thread::spawn(move || loop {
        let event = match crossterm::event::read() {
            Ok(TermEvent::Key(key)) => AppEvent::Key(key),
            Ok(TermEvent::Resize(_, _)) => AppEvent::Resize,
            Ok(_) => continue,
            Err(e) => {
                log::error!("failed to read terminal input: {}", e);
                break;
            }
        };
        if tx.send(event).is_err() {
            break;
        }
    });
}

/// Run `job` on a tokio task. Loads claim their generation here, before spawning,
/// so a later request always supersedes an earlier one.
fn spawn_job(job: Job, app: &App, session: &Arc<Session>, tx: &UnboundedSender<AppEvent>) {
    let (job, generation) = match job {
        Job::Load(query) => (Job::Load(query), session.begin()),
        Job::Retry => match session.begin_retry() {
            Some((generation, query)) => (Job::Load(query), generation),
            None => return,
        },
        other => (other, 0),
    };
    let library = app.library.clone();
    let session = Arc::clone(session);
    let tx = tx.clone();
    tokio::spawn(async move {
        let events = match run_job(job, generation, &session, &library).await {
            Ok(events) => events,
            Err(e) => {
                log::warn!("request failed: {}", e);
                vec![AppEvent::Message(e.to_string())]
            }
        };
        for event in events {
            if tx.send(event).is_err() {
                break;
            }
        }
    });
}

async fn run_job(job: Job, generation: u64, session: &Session, library: &Library) -> crate::Result<Vec<AppEvent>> {
    let backend = session.backend();
    let backend: &dyn Backend = backend.as_ref();
    let events = match job {
        Job::Load(query) => vec![AppEvent::Loaded(session.load_as(generation, &query, &library.bookmarks).await)],
        Job::Retry => Vec::new(),
        Job::RefreshLibrary => vec![AppEvent::Library(Library::fetch(backend).await)],
        Job::SendBookmark(change) => {
            change.send(backend).await?;
            vec![AppEvent::BookmarkSent(change)]
        }
        Job::DeleteHistory(cid) => {
            backend.delete_history(&cid).await?;
            vec![AppEvent::Removed(Removal::History(cid))]
        }
        Job::DeleteBookmark(cid) => {
            backend.delete_bookmark(&cid).await?;
            vec![AppEvent::Removed(Removal::Bookmark(cid))]
        }
        Job::DeleteUpload(cid) => {
            backend.delete_upload(&cid).await?;
            vec![AppEvent::Removed(Removal::Upload(cid))]
        }
        Job::DeleteGroup(id) => {
            backend.delete_group(id).await?;
            vec![AppEvent::Removed(Removal::Group(id)), AppEvent::Message("Group deleted".to_string())]
        }
        Job::RemoveFromGroup(id, cid) => {
            backend.remove_from_group(id, &cid).await?;
            vec![AppEvent::Removed(Removal::GroupCid(id, cid))]
        }
        Job::CreateGroup(name) => {
            let message = create_group(backend, &name).await?;
            vec![AppEvent::Message(message), AppEvent::Library(Library::fetch(backend).await)]
        }
        Job::RenameGroup(id, name) => {
            let message = rename_group(backend, id, &name).await?;
            vec![AppEvent::Message(message), AppEvent::Library(Library::fetch(backend).await)]
        }
        Job::AddToGroup(id, cid) => {
            let message = add_cid_to_group(backend, id, &cid).await?;
            vec![AppEvent::Message(message), AppEvent::Library(Library::fetch(backend).await)]
        }
        Job::Save { cid, filename } => {
            let bytes = backend.download(&cid, &filename).await?;
            tokio::fs::write(&filename, &bytes).await?;
            log::info!("saved {} to {}", cid, filename);
            vec![AppEvent::Message(format!("Saved {}", filename))]
        }
        Job::Dashboard(days) => vec![AppEvent::Dashboard(backend.analytics_dashboard(days).await?)],
        Job::Export(kind, days) => {
            let path = export_csv(backend, kind, days, Path::new(".")).await?;
            vec![AppEvent::Message(format!("Exported {}", path.display()))]
        }
        Job::CidAnalytics { cid, days } => vec![AppEvent::CidAnalytics(cid_analytics(backend, library, &cid, days).await?)],
    };
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;
    use crate::api::{Group, HistoryItem};

    fn session(backend: FakeBackend) -> (Arc<FakeBackend>, Session) {
        let backend = Arc::new(backend);
        let session = Session::new(backend.clone());
        (backend, session)
    }

    #[tokio::test]
    async fn test_load_job_reports_loaded() {
        let (_, session) = session(FakeBackend::default().with_file("QmTxt", "text/plain", Some("hi")));
        let generation = session.begin();
        let events = run_job(Job::Load("QmTxt".to_string()), generation, &session, &Library::default())
            .await
            .unwrap();
        match &events[..] {
            [AppEvent::Loaded(loaded)] => {
                assert_eq!(loaded.generation, generation);
                assert_eq!(loaded.text.as_deref(), Some("hi"));
            }
            other => panic!("unexpected events {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_history_job() {
        let backend = FakeBackend::default();
        backend.history.lock().unwrap().push(HistoryItem { cid: "QmA".to_string(), timestamp: None });
        let (backend, session) = session(backend);
        let events = run_job(Job::DeleteHistory("QmA".to_string()), 0, &session, &Library::default())
            .await
            .unwrap();
        assert!(matches!(&events[..], [AppEvent::Removed(Removal::History(cid))] if cid == "QmA"));
        assert!(backend.history.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_group_cid_never_reaches_backend() {
        let backend = FakeBackend::default();
        backend.groups.lock().unwrap().push(Group {
            id: 1,
            name: "work".to_string(),
            created_at: None,
            cids: Vec::new(),
            cid_count: 0,
        });
        let (backend, session) = session(backend);
        let err = run_job(Job::AddToGroup(1, "nope".to_string()), 0, &session, &Library::default())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Please enter a valid CID"));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_group_refreshes_library() {
        let (_, session) = session(FakeBackend::default());
        let events = run_job(Job::CreateGroup(" photos ".to_string()), 0, &session, &Library::default())
            .await
            .unwrap();
        match &events[..] {
            [AppEvent::Message(message), AppEvent::Library(library)] => {
                assert_eq!(message, "Group \"photos\" created successfully!");
                assert_eq!(library.groups.len(), 1);
            }
            other => panic!("unexpected events {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rename_group_job() {
        let backend = FakeBackend::default();
        backend.groups.lock().unwrap().push(Group {
            id: 2,
            name: "old".to_string(),
            created_at: None,
            cids: Vec::new(),
            cid_count: 0,
        });
        let (_, session) = session(backend);
        let events = run_job(Job::RenameGroup(2, "new".to_string()), 0, &session, &Library::default())
            .await
            .unwrap();
        match &events[..] {
            [AppEvent::Message(message), AppEvent::Library(library)] => {
                assert_eq!(message, "Group renamed to \"new\" successfully!");
                assert_eq!(library.groups[0].name, "new");
            }
            other => panic!("unexpected events {:?}", other),
        }

        let err = run_job(Job::RenameGroup(2, "  ".to_string()), 0, &session, &Library::default())
            .await
            .unwrap_err();
        assert!(err.is_user_facing());
    }

    #[tokio::test]
    async fn test_cid_analytics_job_is_gated() {
        let (_, session) = session(FakeBackend::default());
        let job = Job::CidAnalytics { cid: "QmX".to_string(), days: 7 };
        let err = run_job(job, 0, &session, &Library::default()).await.unwrap_err();
        assert!(err.is_user_facing());
    }
}
