// List rendering for gists, files, and commits.
// Provides styled rows plus loading, error, and empty states.

use chrono::{DateTime, Utc};
use ratatui::{prelude::*, widgets::*};

use crate::app::{App, AvatarStatus};
use crate::github::{Commit, Gist, GistFile};
use crate::state::{LoadingState, PageFetcher, SelectableList};

/// Format a timestamp as relative time (e.g., "2h ago").
pub fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(*dt);

    if duration.num_days() > 0 {
        format!("{}d ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}

/// Human-readable file size.
pub fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

/// One-character marker for an avatar slot.
pub fn avatar_marker(status: &AvatarStatus) -> Span<'static> {
    match status {
        AvatarStatus::Loaded(_) => Span::styled("●", Style::default().fg(Color::Green)),
        AvatarStatus::Loading => Span::styled("◌", Style::default().fg(Color::Yellow)),
        AvatarStatus::Missing => Span::styled("·", Style::default().fg(Color::DarkGray)),
    }
}

/// Render a loading indicator.
pub fn render_loading(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(format!("⏳ {}...", message))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(text, area);
}

/// Render an error message.
pub fn render_error(frame: &mut Frame, area: Rect, error: &str) {
    let text = Paragraph::new(format!("❌ {}", error))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Red));
    frame.render_widget(text, area);
}

/// Render an empty state message.
pub fn render_empty(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(text, area);
}

fn highlight_style() -> Style {
    Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD)
}

/// Title suffix describing the list's paging state.
fn paging_suffix<T, F: PageFetcher<T>>(list: &SelectableList<T, F>) -> String {
    match &list.status {
        status if status.is_refreshing() => " (refreshing…)".to_string(),
        LoadingState::Loading(_) => " (loading…)".to_string(),
        _ if list.is_exhausted() => " (end)".to_string(),
        _ => format!(" (page {})", list.loader().cursor().get()),
    }
}

/// Render a paged list: placeholders while nothing is loaded, rows otherwise.
///
/// Rows stay on screen during a refresh or a failed load more.
fn render_paged<T, F: PageFetcher<T>>(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    rows: Vec<ListItem<'static>>,
    list: &mut SelectableList<T, F>,
    noun: &str,
    border: Style,
) {
    if list.is_empty() {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(format!(" {} ", title));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        match &list.status {
            LoadingState::Loading(_) => render_loading(frame, inner, &format!("Loading {}", noun)),
            LoadingState::Error(e) => render_error(frame, inner, e),
            LoadingState::Idle => render_empty(frame, inner, &format!("No {} found", noun)),
        }
        return;
    }

    let title = format!(" {}{} ", title, paging_suffix(list));
    let list_widget = List::new(rows)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(title),
        )
        .highlight_style(highlight_style())
        .highlight_symbol("> ");

    frame.render_stateful_widget(list_widget, area, &mut list.list_state);
}

fn gist_row(app: &App, gist: &Gist) -> ListItem<'static> {
    let owner = gist
        .owner
        .as_ref()
        .map(|o| o.login.clone())
        .unwrap_or_else(|| "anonymous".to_string());
    let files = gist.files.len();

    ListItem::new(Line::from(vec![
        avatar_marker(&app.avatar(gist.avatar_url())),
        Span::raw(" "),
        Span::styled(format!("{:<20}", owner), Style::default().fg(Color::Cyan)),
        Span::raw(gist.title().to_string()),
        Span::styled(
            format!(
                "  {} file{} · {}",
                files,
                if files == 1 { "" } else { "s" },
                format_relative_time(&gist.updated_at)
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
}

/// Render the public gists list.
pub fn render_gist_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let rows: Vec<ListItem> = app
        .gists
        .gists
        .items()
        .iter()
        .map(|gist| gist_row(app, gist))
        .collect();
    render_paged(
        frame,
        area,
        "Public Gists",
        rows,
        &mut app.gists.gists,
        "gists",
        Style::default(),
    );
}

fn file_row(file: &GistFile) -> ListItem<'static> {
    let language = file.language.clone().unwrap_or_else(|| file.mime_type.clone());
    ListItem::new(Line::from(vec![
        Span::raw(file.filename.clone()),
        Span::styled(
            format!("  {} · {}", language, format_size(file.size)),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
}

/// Render the files of a gist.
pub fn render_files(
    frame: &mut Frame,
    files: &[GistFile],
    state: &mut ListState,
    focused: bool,
    area: Rect,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Files ")
        .border_style(border_style(focused));
    if files.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        render_empty(frame, inner, "No files");
        return;
    }

    let list_widget = List::new(files.iter().map(file_row).collect::<Vec<_>>())
        .block(block)
        .highlight_style(highlight_style())
        .highlight_symbol("> ");
    frame.render_stateful_widget(list_widget, area, state);
}

fn commit_row(commit: &Commit) -> ListItem<'static> {
    let author = commit
        .user
        .as_ref()
        .map(|u| u.login.clone())
        .unwrap_or_else(|| "unknown".to_string());
    let change = commit.change_status;

    ListItem::new(Line::from(vec![
        Span::styled(
            commit.short_version().to_string(),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(format!(" {:<16}", author)),
        Span::styled(format!("+{}", change.additions), Style::default().fg(Color::Green)),
        Span::raw(" "),
        Span::styled(format!("-{}", change.deletions), Style::default().fg(Color::Red)),
        Span::styled(
            format!("  {}", format_relative_time(&commit.committed_at)),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
}

/// Render a gist's commit history.
pub fn render_commits<F: PageFetcher<Commit>>(
    frame: &mut Frame,
    commits: &mut SelectableList<Commit, F>,
    focused: bool,
    area: Rect,
) {
    let rows: Vec<ListItem> = commits.items().iter().map(commit_row).collect();
    render_paged(
        frame,
        area,
        "History",
        rows,
        commits,
        "commits",
        border_style(focused),
    );
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}
