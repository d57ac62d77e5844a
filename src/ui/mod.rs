// UI module for rendering the TUI.
// Draws the gist list or the detail screen, a status bar, and the help overlay.

mod list;

use ratatui::{prelude::*, widgets::*};

use crate::app::{App, AvatarStatus, Screen};
use crate::state::{DetailFocus, GistDetailState};

/// Main draw function that renders the entire UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_title_bar(frame, app, chunks[0]);
    draw_content(frame, app, chunks[1]);
    draw_status_bar(frame, app, chunks[2]);

    // Help overlay (rendered last, on top of everything)
    if app.show_help {
        draw_help_overlay(frame);
    }
}

fn draw_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let location = match &app.screen {
        Screen::List => "public".to_string(),
        Screen::Detail(detail) => format!("public › {}", detail.gist.title()),
    };
    let mut spans = vec![
        Span::styled(
            " gistview ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::raw(location),
    ];

    if let Some((cached, pending)) = app.avatar_stats() {
        let text = if pending > 0 {
            format!("  avatars: {} (+{})", cached, pending)
        } else {
            format!("  avatars: {}", cached)
        };
        spans.push(Span::styled(text, Style::default().fg(Color::DarkGray)));
    }

    if let Some(remaining) = app.rate_limit_remaining() {
        let rate_color = if remaining < 10 {
            Color::Red
        } else if remaining < 30 {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        spans.push(Span::styled(
            format!("  API: {} left", remaining),
            Style::default().fg(rate_color),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_content(frame: &mut Frame, app: &mut App, area: Rect) {
    if matches!(app.screen, Screen::List) {
        list::render_gist_list(frame, app, area);
        return;
    }

    let avatar = match &app.screen {
        Screen::Detail(detail) => app.avatar(detail.gist.avatar_url()),
        Screen::List => AvatarStatus::Missing,
    };
    if let Screen::Detail(detail) = &mut app.screen {
        draw_detail(frame, detail, &avatar, area);
    }
}

fn draw_detail(
    frame: &mut Frame,
    detail: &mut GistDetailState,
    avatar: &AvatarStatus,
    area: Rect,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(1)])
        .split(area);

    draw_detail_header(frame, detail, avatar, chunks[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    let focus = detail.focus;
    list::render_files(
        frame,
        &detail.files,
        &mut detail.file_state,
        focus == DetailFocus::Files,
        panes[0],
    );
    list::render_commits(
        frame,
        &mut detail.commits,
        focus == DetailFocus::Commits,
        panes[1],
    );
}

fn draw_detail_header(
    frame: &mut Frame,
    detail: &GistDetailState,
    avatar: &AvatarStatus,
    area: Rect,
) {
    let gist = &detail.gist;
    let owner = gist
        .owner
        .as_ref()
        .map(|o| o.login.as_str())
        .unwrap_or("anonymous");

    let mut owner_line = vec![list::avatar_marker(avatar), Span::raw(" ")];
    owner_line.push(Span::styled(owner, Style::default().fg(Color::Cyan)));
    if let AvatarStatus::Loaded(image) = avatar {
        owner_line.push(Span::styled(
            format!("  avatar {}×{}", image.width(), image.height()),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let total_files = gist.files.len();
    let files_note = if total_files > detail.files.len() {
        format!("{} of {} files", detail.files.len(), total_files)
    } else {
        format!("{} files", total_files)
    };

    let text = vec![
        Line::from(Span::styled(
            gist.title().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(owner_line),
        Line::from(Span::styled(
            format!(
                "created {} · updated {} · {} · {} comments",
                list::format_relative_time(&gist.created_at),
                list::format_relative_time(&gist.updated_at),
                files_note,
                gist.comments
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let header = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", gist.id)),
    );
    frame.render_widget(header, area);
}

/// Draw the status bar: the latest message or error, otherwise keybinding hints.
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let error = match &app.screen {
        Screen::List => app.gists.gists.status.error(),
        Screen::Detail(detail) => detail.commits.status.error(),
    };

    let line = if let Some(message) = &app.status_message {
        Line::from(vec![Span::raw(" "), Span::raw(message.clone())])
    } else if let Some(error) = error {
        Line::from(Span::styled(
            format!(" {}  (r to retry)", error),
            Style::default().fg(Color::Red),
        ))
    } else {
        let mut hints = vec![
            Span::raw(" ↑↓ "),
            Span::styled("Navigate", Style::default().fg(Color::DarkGray)),
            Span::raw("  ↵ "),
            Span::styled("Open", Style::default().fg(Color::DarkGray)),
        ];
        if matches!(app.screen, Screen::Detail(_)) {
            hints.extend([
                Span::raw("  Tab "),
                Span::styled("Focus", Style::default().fg(Color::DarkGray)),
                Span::raw("  Esc "),
                Span::styled("Back", Style::default().fg(Color::DarkGray)),
            ]);
        }
        hints.extend([
            Span::raw("  n "),
            Span::styled("More", Style::default().fg(Color::DarkGray)),
            Span::raw("  r "),
            Span::styled("Refresh", Style::default().fg(Color::DarkGray)),
            Span::raw("  ? "),
            Span::styled("Help", Style::default().fg(Color::DarkGray)),
            Span::raw("  q "),
            Span::styled("Quit", Style::default().fg(Color::DarkGray)),
        ]);
        Line::from(hints)
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn help_line(keys: &'static str, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<14}", keys), Style::default().fg(Color::Cyan)),
        Span::raw(action),
    ])
}

/// Draw the help overlay.
fn draw_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    let popup_width = 48.min(area.width);
    let popup_height = 15.min(area.height);
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        help_line("↑/↓ or j/k", "Move selection"),
        help_line("Enter", "Open gist / show file URL"),
        help_line("Esc", "Back to the list"),
        help_line("Tab", "Switch files / history"),
        help_line("n", "Load the next page"),
        help_line("r", "Reload from page 1"),
        help_line("?", "Show/hide this help"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let help = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(help, popup_area);
}
