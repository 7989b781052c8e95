// src/app/ui.rs
use ratatui::{prelude::*, widgets::*};

use super::state::{App, Focus, Panel};
use crate::listing::FolderStats;
use crate::preview::PreviewContent;
use crate::utils::{format_number, format_size, plural};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)])
        .split(f.size());

    draw_header(f, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(chunks[1]);
    draw_side(f, app, body[0]);
    draw_main(f, app, body[1]);

    draw_status(f, app, chunks[2]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(input) = &app.input {
        Line::from(vec![
            Span::styled(format!("{}: ", input.kind.prompt()), Style::default().fg(Color::Yellow)),
            Span::raw(input.buffer.clone()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ])
    } else if app.is_home() {
        Line::from(Span::styled(
            "cidtui  press : to open a CID",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
    } else {
        let mut spans = vec![Span::styled(
            format!("{} ", short_cid(app.navigator.base())),
            Style::default().fg(Color::Cyan),
        )];
        let crumbs = app.navigator.breadcrumbs();
        let last = crumbs.len() - 1;
        for (i, crumb) in crumbs.iter().enumerate() {
            let style = if i == last {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!("[{}] {}", i, crumb.name), style));
            if i != last {
                spans.push(Span::raw(" › "));
            }
        }
        if app.bookmarked {
            spans.push(Span::styled("  ★", Style::default().fg(Color::Yellow)));
        }
        Line::from(spans)
    };
    let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_side(f: &mut Frame, app: &App, area: Rect) {
    let panel = app.focus.panel().unwrap_or(Panel::History);
    let focused = app.focus != Focus::Listing;
    let index = Panel::ALL.iter().position(|p| *p == panel).unwrap_or(0);

    let mut title = format!(" {} ({}/{}) ", panel.title(), index + 1, Panel::ALL.len());
    if panel == Panel::Analytics {
        title = format!(" Analytics, {} days ", app.period);
    }

    let items: Vec<ListItem> = app
        .side_items(panel)
        .into_iter()
        .map(|item| ListItem::new(item.label))
        .collect();
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL).border_style(Style::default().fg(border)))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default().with_selected(focused.then_some(app.side_selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_main(f: &mut Frame, app: &App, area: Rect) {
    if app.is_home() {
        f.render_widget(home_help(), area);
        return;
    }
    if app.loading {
        let loading = Paragraph::new("Loading...").block(Block::default().borders(Borders::ALL));
        f.render_widget(loading, area);
        return;
    }
    if let Some(error) = &app.error {
        let text = vec![
            Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))),
            Line::from(""),
            Line::from("press r to retry"),
        ];
        let error = Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(Block::default().title(" Error ").borders(Borders::ALL));
        f.render_widget(error, area);
        return;
    }

    match &app.meta {
        Some(meta) if meta.is_dir => draw_listing(f, app, area),
        Some(_) => draw_file(f, app, area),
        None => {}
    }
}

fn draw_listing(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let query = &app.listing.query;
    let title = format!(
        " Contents, sort: {} {}{}{} ",
        query.sort_by.label(),
        query.sort_order.label(),
        if query.show_hidden { ", hidden shown" } else { "" },
        if query.search.is_empty() { String::new() } else { format!(", filter: {}", query.search) },
    );

    let visible = app.listing.visible();
    let items: Vec<ListItem> = if visible.is_empty() {
        let message = if app.listing.entries.is_empty() { "This folder is empty" } else { "No matching entries" };
        vec![ListItem::new(Span::styled(message, Style::default().fg(Color::DarkGray)))]
    } else {
        visible
            .iter()
            .map(|entry| {
                let name_style = if entry.is_dir {
                    Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let modified = entry
                    .modified_at
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{} ", entry.category().icon())),
                    Span::styled(entry.name.clone(), name_style),
                    Span::styled(format!("  {}", entry.display_size()), Style::default().fg(Color::Gray)),
                    Span::styled(format!("  {}", modified), Style::default().fg(Color::DarkGray)),
                ]))
            })
            .collect()
    };

    let focused = app.focus == Focus::Listing && !visible.is_empty();
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(focused.then_some(app.selected));
    f.render_stateful_widget(list, chunks[0], &mut state);

    if let Some(stats) = app.listing.stats() {
        f.render_widget(Paragraph::new(stats_line(&stats)), chunks[1]);
    }
}

fn stats_line(stats: &FolderStats) -> String {
    let mut line = format!(
        "{}, {}, {}",
        plural(stats.folder_count as u64, "folder"),
        plural(stats.file_count as u64, "file"),
        format_size(stats.total_size_bytes)
    );
    if stats.hidden_count > 0 {
        line.push_str(&format!(", {} hidden", stats.hidden_count));
    }
    line
}

fn draw_file(f: &mut Frame, app: &App, area: Rect) {
    let info_height = if app.cid_analytics.is_some() { 4 } else { 3 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(info_height), Constraint::Min(3)])
        .split(area);

    let mut lines = Vec::new();
    if let Some(meta) = &app.meta {
        let mut info = format!("{}  {}", meta.content_type, format_size(meta.size));
        if let Some(gateway) = &meta.gateway_used {
            info.push_str(&format!("  via {}", gateway));
        }
        lines.push(Line::from(info));
    }
    if let Some(stats) = &app.cid_analytics {
        lines.push(Line::from(format!(
            "{} views, {} downloads, {} users in {} days",
            format_number(stats.total_views),
            format_number(stats.total_downloads),
            format_number(stats.unique_users),
            stats.period_days
        )));
    }
    let info = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    f.render_widget(info, chunks[0]);

    let (text, style) = match &app.preview {
        Some(PreviewContent::Text(text)) => (text.clone(), Style::default()),
        Some(PreviewContent::Binary(summary)) => (summary.clone(), Style::default().fg(Color::Gray)),
        Some(PreviewContent::Error(message)) => (message.clone(), Style::default().fg(Color::Red)),
        None => (String::new(), Style::default()),
    };
    let preview = Paragraph::new(text)
        .style(style)
        .block(Block::default().title(" Preview ").borders(Borders::ALL));
    f.render_widget(preview, chunks[1]);
}

fn home_help() -> Paragraph<'static> {
    let keys = [
        (": g", "open a CID"),
        ("enter", "open selection"),
        ("h bksp", "up one folder"),
        ("0-9 #", "jump to breadcrumb, # for any index"),
        ("/", "search in folder"),
        ("s o .", "sort key, order, hidden files"),
        ("b", "bookmark"),
        ("w", "save file"),
        ("tab", "next side panel"),
        ("d", "delete side item"),
        ("n R a", "new group, rename group, add CID to group"),
        ("p e", "analytics period, export CSV"),
        ("i", "analytics for this CID"),
        ("r", "retry"),
        ("q", "quit"),
    ];
    let lines: Vec<Line> = keys
        .iter()
        .map(|(key, help)| {
            Line::from(vec![
                Span::styled(format!("{:>8}  ", key), Style::default().fg(Color::Yellow)),
                Span::raw(*help),
            ])
        })
        .collect();
    Paragraph::new(lines).block(Block::default().title(" Keys ").borders(Borders::ALL))
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let text = match &app.status {
        Some(status) => status.clone(),
        None => "q quit  : open  / search  tab panels".to_string(),
    };
    f.render_widget(Paragraph::new(text).style(Style::default().fg(Color::DarkGray)), area);
}

fn short_cid(cid: &str) -> String {
    if cid.chars().count() <= 16 {
        return cid.to_string();
    }
    let head: String = cid.chars().take(8).collect();
    let tail: String = cid.chars().rev().take(6).collect::<Vec<_>>().into_iter().rev().collect();
    format!("{}…{}", head, tail)
}
