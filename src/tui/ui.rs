use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Sparkline, Table, Tabs},
    Frame,
};
use chrono::Local;
use crate::models::Priority;
use crate::pomodoro::Phase;
use super::app::{App, InputMode, InputField, SettingsField, ViewMode};

/// Colors derived from the dark-mode setting.
struct Theme {
    base: Style,
    accent: Color,
    muted: Color,
    highlight: Color,
}

impl Theme {
    fn new(dark: bool) -> Theme {
        if dark {
            Theme {
                base: Style::default().bg(Color::Black).fg(Color::White),
                accent: Color::Cyan,
                muted: Color::DarkGray,
                highlight: Color::Rgb(50, 50, 70),
            }
        } else {
            Theme {
                base: Style::default(),
                accent: Color::Blue,
                muted: Color::Gray,
                highlight: Color::DarkGray,
            }
        }
    }
}

fn priority_color(p: Priority) -> Color {
    match p {
        Priority::Urgent => Color::Red,
        Priority::Important => Color::Yellow,
        Priority::Normal => Color::Blue,
        Priority::Routine => Color::Green,
    }
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let theme = Theme::new(app.dark_mode());
    f.render_widget(Block::default().style(theme.base), f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(0),    // Body
            Constraint::Length(1), // Status
            Constraint::Length(3), // Help
        ].as_ref())
        .split(f.area());

    let selected = ViewMode::ALL.iter().position(|v| *v == app.view_mode).unwrap_or(0);
    let tabs = Tabs::new(ViewMode::ALL.iter().map(|v| v.title()).collect::<Vec<_>>())
        .select(selected)
        .block(Block::default().borders(Borders::ALL).title("daytask"))
        .highlight_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, chunks[0]);

    match app.view_mode {
        ViewMode::Tasks => render_tasks(f, app, &theme, chunks[1]),
        ViewMode::Stats => render_stats(f, app, &theme, chunks[1]),
        ViewMode::Pomodoro => render_pomodoro(f, app, &theme, chunks[1]),
        ViewMode::Settings => render_settings(f, app, &theme, chunks[1]),
    }

    let status = Paragraph::new(app.status.clone().unwrap_or_default())
        .style(Style::default().fg(Color::Yellow));
    f.render_widget(status, chunks[2]);

    let help_text = match app.input_mode {
        InputMode::Normal => match app.view_mode {
            ViewMode::Tasks => "q: Quit | Tab: View | a: Add | Space: Done | e: Title | D: Desc | p: Prio | s: Slot | g: Cat | f: Filter | T: Finish Today | C: Clear Done | d: Del",
            ViewMode::Stats => "q: Quit | Tab: View",
            ViewMode::Pomodoro => "q: Quit | Tab: View | Space: Start/Pause | r: Reset | n: Skip",
            ViewMode::Settings => "q: Quit | Tab: View | j/k: Move | Space: Toggle",
        },
        InputMode::Editing => "Enter: Save | Esc: Cancel",
        InputMode::Adding => "Enter: Next Step | Esc: Cancel",
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(theme.muted))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[3]);

    // Render Input Box if needed
    if app.input_mode != InputMode::Normal {
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);

        let title = match app.input_mode {
            InputMode::Adding => app.add_state.prompt(),
            InputMode::Editing => match app.input_field {
                InputField::Title => "Edit Title",
                InputField::Description => "Edit Description",
                InputField::None => "Edit",
            },
            InputMode::Normal => "",
        };

        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));

        f.render_widget(input, area);
    }
}

fn render_tasks(f: &mut Frame, app: &mut App, theme: &Theme, area: Rect) {
    let rows: Vec<Row> = app
        .tasks
        .iter()
        .map(|t| {
            let style = if t.is_completed {
                Style::default().fg(theme.muted).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(if t.is_completed { "[x]" } else { "[ ]" }),
                Cell::from(t.title.clone()),
                Cell::from(t.priority.as_str()).style(Style::default().fg(priority_color(t.priority))),
                Cell::from(t.time_slot.as_str()),
                Cell::from(t.category.as_str()),
                Cell::from(t.created_at.with_timezone(&Local).format("%m-%d %H:%M").to_string()),
                Cell::from(if t.is_recurring { t.recurring_type.as_str() } else { "" }),
                Cell::from(t.description.clone()),
            ]).style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Min(20),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(12),
        Constraint::Length(7),
        Constraint::Min(10),
    ];

    let title = format!("Tasks ({})", app.filter);
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["", "Title", "Priority", "Slot", "Category", "Created", "Repeat", "Description"])
            .style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(theme.highlight))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_stats(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let stats = app.repo.stats();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(8), Constraint::Length(5)].as_ref())
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(chunks[0]);

    let mut lines = Vec::new();
    for (label, rate) in [
        ("Today", stats.today_completion_rate()),
        ("Last 7 days", stats.week_completion_rate()),
        ("All time", stats.overall_stats()),
    ] {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<12}", label), Style::default().fg(theme.accent)),
            Span::raw(format!("{:>3}%  ({}/{})", rate.percent, rate.completed, rate.total)),
        ]));
    }
    lines.push(Line::from(format!("Pomodoros   {}", app.repo.pomodoro_count())));
    let rates = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Completion"));
    f.render_widget(rates, top[0]);

    let categories: Vec<Line> = stats
        .category_breakdown()
        .into_iter()
        .map(|(c, n)| Line::from(format!("{:<10}{}", c.as_str(), n)))
        .collect();
    let categories = Paragraph::new(categories)
        .block(Block::default().borders(Borders::ALL).title("Categories"));
    f.render_widget(categories, top[1]);

    let counts = stats.daily_counts(7);
    let labels: Vec<String> = counts.iter().map(|d| d.label()).collect();
    let data: Vec<(&str, u64)> = labels
        .iter()
        .zip(&counts)
        .map(|(l, d)| (l.as_str(), d.count as u64))
        .collect();
    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title("Tasks created (7 days)"))
        .data(data.as_slice())
        .bar_width(5)
        .bar_gap(2)
        .bar_style(Style::default().fg(theme.accent))
        .value_style(Style::default().fg(Color::Black).bg(theme.accent));
    f.render_widget(chart, chunks[1]);

    let trend: Vec<u64> = stats.daily_completion_trend(7).into_iter().map(u64::from).collect();
    let sparkline = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title("Completion trend (7 days)"))
        .data(&trend)
        .max(100)
        .style(Style::default().fg(Color::Green));
    f.render_widget(sparkline, chunks[2]);
}

fn render_pomodoro(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let timer = &app.timer;
    let color = match timer.phase() {
        Phase::Focus => Color::Red,
        Phase::Break => Color::Blue,
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let state = if timer.is_running() { "running" } else { "paused" };
    let text = vec![
        Line::from(Span::styled(
            format!("{} · {}", timer.phase().name(), state),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(timer.display(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(format!("Sessions completed: {}", timer.session_count())),
    ];
    let clock = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Pomodoro"));
    f.render_widget(clock, chunks[0]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(color).bg(theme.highlight))
        .ratio(timer.progress().clamp(0.0, 1.0));
    f.render_widget(gauge, chunks[1]);
}

fn render_settings(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let settings = app.repo.settings();
    let rows: Vec<Row> = SettingsField::ALL
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let on = match field {
                SettingsField::Notifications => settings.notifications,
                SettingsField::DarkMode => settings.dark_mode,
                SettingsField::MorningReminder => settings.morning_reminder,
            };
            let style = if i == app.settings_selected {
                Style::default().add_modifier(Modifier::BOLD).bg(theme.highlight)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(field.label()),
                Cell::from(if on { "on" } else { "off" }),
            ]).style(style)
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(20), Constraint::Length(5)])
        .block(Block::default().borders(Borders::ALL).title("Settings"));
    f.render_widget(table, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
