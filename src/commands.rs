// src/commands.rs
use anyhow::{bail, Context};
use cidtui::analytics::{cid_analytics, export_csv, RealtimePoller, DEFAULT_PERIOD};
use cidtui::api::{AnalyticsDashboard, ApiClient, Backend, RealtimeAnalytics};
use cidtui::cid::{is_valid_cid, CidPath};
use cidtui::config::{Config, Visibility};
use cidtui::library::{add_cid_to_group, create_group, rename_group, Library};
use cidtui::listing::{ListingQuery, ListingView, SortBy, SortOrder};
use cidtui::nav::Navigator;
use cidtui::preview::{suggested_filename, validate_filename};
use cidtui::upload::upload_path;
use cidtui::utils::{format_number, format_size, plural};
use colored::*;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::args::{AnalyticsAction, Command, GroupAction};

pub async fn run(command: Command, config: &Config, client: ApiClient) -> anyhow::Result<()> {
    let client = Arc::new(client);
    let backend: Arc<dyn Backend> = client.clone();
    match command {
        Command::Ls { query, sort, order, all, filter } => {
            let listing_query = ls_query(config, &sort, &order, all, filter);
            list(backend.as_ref(), &query, listing_query).await
        }
        Command::Meta { cid } => {
            let meta = backend.metadata(&cid).await?;
            println!("{} {}", "CID:".bold(), meta.cid);
            println!("{} {}", "Type:".bold(), meta.content_type);
            println!("{} {}", "Size:".bold(), format_size(meta.size));
            println!("{} {}", "Directory:".bold(), meta.is_dir);
            if let Some(gateway) = meta.gateway_used {
                println!("{} {}", "Gateway:".bold(), gateway);
            }
            println!("{} {}", "Link:".bold(), Navigator::open(&cid).location());
            if !meta.is_dir {
                let filename = suggested_filename(&cid, Some(&meta.content_type));
                println!("{} {}", "Download:".bold(), client.download_url(&cid, &filename));
                println!("{} {}", "Save as:".bold(), filename);
            }
            Ok(())
        }
        Command::History { delete } => {
            if let Some(cid) = delete {
                backend.delete_history(&cid).await?;
                println!("{} removed {} from history", "✓".green(), cid);
                return Ok(());
            }
            for item in backend.history().await? {
                println!("{}  {}", item.cid, item.timestamp.unwrap_or_default().dimmed());
            }
            Ok(())
        }
        Command::Bookmarks { delete } => {
            if let Some(cid) = delete {
                backend.delete_bookmark(&cid).await?;
                println!("{} bookmark removed", "✓".green());
                return Ok(());
            }
            for bookmark in backend.bookmarks().await? {
                let size = bookmark.size_human.unwrap_or_else(|| format_size(bookmark.size));
                println!("{}  {}  {}", bookmark.cid, bookmark.title.bold(), size.dimmed());
            }
            Ok(())
        }
        Command::Uploads { delete } => {
            if let Some(cid) = delete {
                backend.delete_upload(&cid).await?;
                println!("{} upload removed", "✓".green());
                return Ok(());
            }
            for upload in backend.uploads().await? {
                let size = upload.size_human.unwrap_or_else(|| format_size(upload.file_size));
                println!("{}  {}  [{}]  {}", upload.cid, upload.file_name.bold(), upload.visibility, size.dimmed());
            }
            Ok(())
        }
        Command::Groups => {
            for group in backend.groups().await? {
                println!("{:>4}  {}  {}", group.id, group.name.bold(), plural(group.cid_count as u64, "CID").dimmed());
            }
            Ok(())
        }
        Command::Group { action } => group(backend.as_ref(), action).await,
        Command::Analytics { action } => analytics(backend, config, action).await,
        Command::Upload { path, private } => {
            let visibility = if private { Visibility::Private } else { config.visibility };
            let summary = upload_path(backend.as_ref(), &path, visibility).await?;
            println!("{} uploaded {} ({})", "✓".green(), summary.name.bold(), format_size(summary.size));
            println!("{}", summary.cid);
            for (path, cid) in summary.files {
                println!("  {}  {}", cid, path.dimmed());
            }
            Ok(())
        }
        Command::Download { cid, output } => {
            let filename = match output {
                Some(name) => validate_filename(&name)?,
                None => {
                    let meta = backend.metadata(&cid).await?;
                    suggested_filename(&cid, Some(&meta.content_type))
                }
            };
            let bytes = backend.download(&cid, &filename).await?;
            tokio::fs::write(&filename, &bytes)
                .await
                .with_context(|| format!("failed to write {}", filename))?;
            println!("{} saved {} ({})", "✓".green(), filename, format_size(bytes.len() as u64));
            Ok(())
        }
        Command::Validate { cid } => {
            let parsed = validated_cid(&cid)?;
            println!("{} {} is a valid CID", "✓".green(), parsed.base);
            if !parsed.segments.is_empty() {
                println!("  path {}", parsed.path().dimmed());
            }
            Ok(())
        }
        Command::Config { save } => {
            print!("{}", toml::to_string_pretty(config)?);
            if save {
                let path = Config::default_path().context("no config directory on this system")?;
                config.save_to(&path)?;
                println!("{} wrote {}", "✓".green(), path.display());
            }
            Ok(())
        }
    }
}

/// Flags of `ls` layered over the configured listing defaults.
fn ls_query(config: &Config, sort: &str, order: &str, all: bool, filter: Option<String>) -> ListingQuery {
    ListingQuery {
        search: filter.unwrap_or_default(),
        show_hidden: all || config.show_hidden,
        sort_by: SortBy::parse(sort),
        sort_order: SortOrder::parse(order),
    }
}

/// Accepts `CID` or `CID/path`; only the base has to be well formed.
fn validated_cid(input: &str) -> anyhow::Result<CidPath> {
    let parsed = CidPath::parse(input);
    if !is_valid_cid(&parsed.base) {
        bail!("{} is not a valid CID", input.trim());
    }
    Ok(parsed)
}

async fn list(backend: &dyn Backend, query: &str, listing_query: ListingQuery) -> anyhow::Result<()> {
    let navigator = Navigator::open(query);
    let crumbs: Vec<String> = navigator.breadcrumbs().into_iter().map(|c| c.name).collect();
    println!("{} {}", navigator.base().cyan(), crumbs.join(" / ").bold());
    println!("{}", navigator.location().dimmed());

    let meta = backend.metadata(query).await?;
    if !meta.is_dir {
        bail!("{} is a {} file, not a directory", query, meta.content_type);
    }
    let mut view = ListingView::new(listing_query);
    view.set_entries(backend.list(query).await?);

    for entry in view.visible() {
        let name = if entry.is_dir { entry.name.blue().bold() } else { entry.name.normal() };
        let modified = entry.modified_at.map(|t| t.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_default();
        println!("{} {:<40} {:>12}  {}", entry.category().icon(), name, entry.display_size(), modified.dimmed());
    }
    match view.stats() {
        Some(stats) => println!(
            "\n{}, {}, {}{}",
            plural(stats.folder_count as u64, "folder"),
            plural(stats.file_count as u64, "file"),
            format_size(stats.total_size_bytes),
            if stats.hidden_count > 0 { format!(", {} hidden", stats.hidden_count) } else { String::new() }
        ),
        None => println!("{}", "This folder is empty".dimmed()),
    }
    Ok(())
}

async fn group(backend: &dyn Backend, action: GroupAction) -> anyhow::Result<()> {
    let message = match action {
        GroupAction::Show { id } => {
            let group = backend.group(id).await?;
            println!("{} ({})", group.name.bold(), plural(group.cid_count as u64, "CID"));
            for c in group.cids {
                let size = c.size_human.unwrap_or_else(|| format_size(c.file_size));
                println!("  {}  {}  {}", c.cid, c.file_name, size.dimmed());
            }
            return Ok(());
        }
        GroupAction::Create { name } => create_group(backend, &name).await?,
        GroupAction::Rename { id, name } => rename_group(backend, id, &name).await?,
        GroupAction::Delete { id } => {
            backend.delete_group(id).await?;
            "Group deleted".to_string()
        }
        GroupAction::Add { id, cid } => add_cid_to_group(backend, id, &cid).await?,
        GroupAction::Remove { id, cid } => {
            backend.remove_from_group(id, &cid).await?;
            "CID removed from group".to_string()
        }
    };
    println!("{} {}", "✓".green(), message);
    Ok(())
}

async fn analytics(backend: Arc<dyn Backend>, config: &Config, action: AnalyticsAction) -> anyhow::Result<()> {
    match action {
        AnalyticsAction::Dashboard { days } => {
            let days = days.unwrap_or(if config.analytics_days > 0 { config.analytics_days } else { DEFAULT_PERIOD });
            print_dashboard(&backend.analytics_dashboard(days).await?);
        }
        AnalyticsAction::Realtime { watch: false } => print_realtime(&backend.analytics_realtime().await?),
        AnalyticsAction::Realtime { watch: true } => {
            let (tx, mut rx) = mpsc::unbounded_channel();
            let mut poller = RealtimePoller::start(backend, config.realtime_interval(), tx, |data| data);
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    data = rx.recv() => match data {
                        Some(data) => print_realtime(&data),
                        None => break,
                    },
                }
            }
            poller.stop();
        }
        AnalyticsAction::Cid { cid, days } => {
            let library = Library { uploads: backend.uploads().await?, ..Default::default() };
            let stats = cid_analytics(backend.as_ref(), &library, &cid, days).await?;
            println!("{} {}", stats.cid.bold(), stats.filename.unwrap_or_default());
            println!(
                "{} views, {} downloads, {} unique users in {} days",
                format_number(stats.total_views),
                format_number(stats.total_downloads),
                format_number(stats.unique_users),
                stats.period_days
            );
            if let Some(peak) = stats.peak_day {
                println!("peak {} with {} views", peak, stats.peak_day_views);
            }
            for activity in stats.recent_activity {
                println!("  {}  {}", activity.timestamp.unwrap_or_default().dimmed(), activity.action);
            }
        }
        AnalyticsAction::Export { kind, days, dir } => {
            let days = days.unwrap_or(config.analytics_days);
            let path = export_csv(backend.as_ref(), kind, days, &dir).await?;
            println!("{} wrote {}", "✓".green(), path.display());
        }
    }
    Ok(())
}

fn print_dashboard(dashboard: &AnalyticsDashboard) {
    println!("{}", format!("Last {} days", dashboard.period_days).bold());
    println!(
        "{} views, {} downloads, {} CIDs",
        format_number(dashboard.totals.views),
        format_number(dashboard.totals.downloads),
        format_number(dashboard.totals.unique_cids)
    );
    let sections = [("Top viewed", &dashboard.top_viewed), ("Top downloaded", &dashboard.top_downloaded)];
    for (title, ranked) in sections {
        if ranked.is_empty() {
            continue;
        }
        println!("\n{}", title.bold());
        for item in ranked {
            println!("{:>8}  {}  {}", format_number(item.count), item.cid, item.filename.clone().unwrap_or_default().dimmed());
        }
    }
    let sources = [("Traffic sources", &dashboard.traffic_sources), ("Gateways", &dashboard.gateway_usage)];
    for (title, counts) in sources {
        if counts.is_empty() {
            continue;
        }
        println!("\n{}", title.bold());
        for source in counts {
            println!("{:>8}  {}", format_number(source.count), source.label);
        }
    }
}

fn print_realtime(data: &RealtimeAnalytics) {
    println!(
        "{} {} views, {} downloads, {} active sessions",
        data.timestamp.clone().unwrap_or_default().dimmed(),
        format_number(data.recent_views),
        format_number(data.recent_downloads),
        format_number(data.active_sessions)
    );
    for hot in &data.hot_cids {
        println!("  {} {}", "🔥".red(), hot.cid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Args;
    use clap::Parser;

    const CID: &str = "QmT78zSuBmuS4z925WZfrqQ1qHaJ56DQaTfyMUF7F8ff91";

    fn ls_from(argv: &[&str], config: &Config) -> ListingQuery {
        let args = Args::try_parse_from(argv).unwrap();
        match args.command {
            Some(Command::Ls { sort, order, all, filter, .. }) => ls_query(config, &sort, &order, all, filter),
            other => panic!("expected ls, got {:?}", other),
        }
    }

    #[test]
    fn test_ls_flags_map_to_listing_query() {
        let query = ls_from(
            &["cidtui", "ls", CID, "--sort", "size", "--order", "desc", "-a", "--filter", "jpg"],
            &Config::default(),
        );
        assert_eq!(query.sort_by, SortBy::Size);
        assert_eq!(query.sort_order, SortOrder::Descending);
        assert!(query.show_hidden);
        assert_eq!(query.search, "jpg");
    }

    #[test]
    fn test_ls_defaults() {
        let query = ls_from(&["cidtui", "ls", CID], &Config::default());
        assert_eq!(query, ListingQuery::default());

        let config = Config { show_hidden: true, ..Config::default() };
        let query = ls_from(&["cidtui", "ls", CID, "--sort", "modified", "--order", "sideways"], &config);
        assert_eq!(query.sort_by, SortBy::Date);
        assert_eq!(query.sort_order, SortOrder::Ascending);
        assert!(query.show_hidden);
    }

    #[test]
    fn test_validate_splits_base_from_path() {
        let parsed = validated_cid(&format!(" {}/photos/2024 ", CID)).unwrap();
        assert_eq!(parsed.base, CID);
        assert_eq!(parsed.path(), "photos/2024");
        assert!(validated_cid("QmShort/photos").is_err());
        assert!(validated_cid("").is_err());
    }
}
