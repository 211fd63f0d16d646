use chrono::Local;
use focuslog::{
    Clock, TimerMode,
    app::{App, View},
};
use ratatui::{prelude::*, widgets::*};

const BORDER_COLOR: Color = Color::Rgb(0, 200, 255);
const ACCENT_COLOR: Color = Color::Rgb(255, 100, 0);

fn mode_color(mode: TimerMode) -> Color {
    match mode {
        TimerMode::Focus => Color::Rgb(100, 181, 246),
        TimerMode::ShortBreak => Color::Rgb(255, 0, 100),
        TimerMode::LongBreak => Color::Rgb(0, 255, 150),
    }
}

pub fn render_ui<C: Clock>(f: &mut Frame, app: &App<C>, animation_frame: u8) {
    match app.view {
        View::Timer => render_timer(f, app, animation_frame),
        View::Stats => render_stats(f, app),
        View::Help => render_help(f),
    }
}

fn render_timer<C: Clock>(f: &mut Frame, app: &App<C>, animation_frame: u8) {
    let timer = app.timer();
    let state = timer.state();
    let settings = timer.settings();
    let color = mode_color(state.mode);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3)])
        .split(f.size());

    let header = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(Span::styled(" 🍅 FOCUSLOG ", Style::default()
            .fg(ACCENT_COLOR).add_modifier(Modifier::BOLD)));
    f.render_widget(header, chunks[0]);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(10),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Length(5), Constraint::Length(1),
            Constraint::Length(2), Constraint::Length(1),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Percentage(10),
        ])
        .split(chunks[1]);

    // Mode tabs, current one highlighted
    let tabs: Vec<Span> = TimerMode::ALL
        .iter()
        .enumerate()
        .flat_map(|(i, mode)| {
            let style = if *mode == state.mode {
                Style::default().fg(mode_color(*mode)).add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            [Span::styled(format!(" {} {} ", i + 1, mode.name()), style), Span::raw("  ")]
        })
        .collect();
    f.render_widget(Paragraph::new(Line::from(tabs)).alignment(Alignment::Center), sections[1]);

    let secs = state.seconds_remaining;
    let time_str = format!("{:02}:{:02}", secs / 60, secs % 60);
    f.render_widget(
        Paragraph::new(time_str)
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[3]
    );

    let paused = !state.is_running;
    let status = if paused {
        format!("⏸  PAUSED{}", ".".repeat((animation_frame / 5) as usize % 4))
    } else {
        format!("{} RUNNING", if animation_frame < 10 { "●" } else { "○" })
    };
    f.render_widget(
        Paragraph::new(status)
            .style(Style::default()
                .fg(if paused { Color::Yellow } else { Color::Green })
                .add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[5]
    );

    f.render_widget(
        Gauge::default()
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded))
            .gauge_style(Style::default().fg(color).bg(Color::Black))
            .percent((state.progress_ratio(settings) * 100.0) as u16),
        sections[7]
    );

    let every = settings.long_break_every_n_sessions.max(1);
    let summary = app.local_summary();
    let session_text = format!(
        "Session {} of {}  •  {} min focused today  •  {} day streak",
        state.completed_focus_count % every + 1,
        every,
        summary.today_minutes,
        summary.streak_days
    );
    f.render_widget(
        Paragraph::new(session_text).style(Style::default().fg(Color::Gray)).alignment(Alignment::Center),
        sections[9]
    );

    let controls = vec![
        Line::from(vec![
            span_key("Space"), Span::raw(" Start/Pause  •  "),
            span_key("R"), Span::raw(" Reset  •  "),
            span_key("1/2/3"), Span::raw(" Mode"),
        ]),
        Line::from(vec![
            span_key("S"), Span::raw(" Stats  •  "),
            span_key("E"), Span::raw(" Export  •  "),
            span_key("?"), Span::raw(" Help  •  "),
            span_key("Q"), Span::raw(" Quit"),
        ]),
    ];
    f.render_widget(
        Paragraph::new(controls).alignment(Alignment::Center).style(Style::default().fg(Color::DarkGray)),
        chunks[2]
    );
}

fn span_key(text: &str) -> Span<'_> {
    Span::styled(text, Style::default().fg(ACCENT_COLOR).add_modifier(Modifier::BOLD))
}

fn render_help(f: &mut Frame) {
    let area = centered_rect(70, 85, f.size());

    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled("⌨️  KEYBOARD SHORTCUTS", Style::default().fg(ACCENT_COLOR).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("  Timer Controls:"),
        help_line("Space", "Start or pause the countdown"),
        help_line("R", "Reset the current mode"),
        help_line("1", "Switch to focus"),
        help_line("2", "Switch to short break"),
        help_line("3", "Switch to long break"),
        Line::from(""),
        Line::from("  Navigation:"),
        help_line("S", "Toggle statistics"),
        help_line("E", "Export focus log as CSV"),
        help_line("H / ?", "Toggle help"),
        Line::from(""),
        Line::from("  General:"),
        help_line("Q / Esc", "Exit / Go back"),
        help_line("Ctrl+C", "Force quit"),
        Line::from(""),
        Line::from(Span::styled("💡 Every focused minute is logged • Switching modes closes the session",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))),
    ];

    f.render_widget(
        Paragraph::new(help_text)
            .alignment(Alignment::Left)
            .block(Block::default()
                .title(" Help ")
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR))),
        area
    );
}

fn help_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("    "),
        Span::styled(key, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!("  {}", desc)),
    ])
}

fn render_stats<C: Clock>(f: &mut Frame, app: &App<C>) {
    let area = centered_rect(70, 85, f.size());
    let summary = app.local_summary();

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("📊 FOCUS STATISTICS", Style::default().fg(ACCENT_COLOR).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled("  Press E to export CSV", Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))),
        Line::from(""),
        Line::from(Span::styled("  📅 Today:", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))),
        stat_line("Focus time", format!("{} min", summary.today_minutes)),
        stat_line("Streak", format!("{} days", summary.streak_days)),
        Line::from(""),
        Line::from(Span::styled("  📈 All Time:", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))),
        stat_line("Sessions completed", summary.completed_sessions.to_string()),
        stat_line("Total focus time", format!("{:.1} hours", summary.total_minutes as f64 / 60.0)),
        Line::from(""),
        Line::from(Span::styled("  🗓  Last 7 days:", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))),
        Line::from(""),
    ];

    let max = summary.last_seven_days.iter().map(|(_, m)| *m).max().unwrap_or(1).max(1);
    for (day, minutes) in &summary.last_seven_days {
        let width = (*minutes as f64 / max as f64 * 30.0) as usize;
        lines.push(Line::from(vec![
            Span::styled(format!("  {} ", day.format("%a")), Style::default().fg(Color::Gray)),
            Span::styled("█".repeat(width), Style::default().fg(ACCENT_COLOR)),
            Span::raw(format!(" {}m", minutes)),
        ]));
    }

    let today = Local::now().format("%A, %B %d, %Y").to_string();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(format!("  {today}"), Style::default().fg(Color::DarkGray))));

    f.render_widget(
        Paragraph::new(lines)
            .block(Block::default()
                .title(" Statistics ")
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR))),
        area
    );
}

fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("     {}: ", label)),
        Span::styled(value, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
    ])
}

fn centered_rect(w: u16, h: u16, r: Rect) -> Rect {
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h) / 2),
            Constraint::Percentage(h),
            Constraint::Percentage((100 - h) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w) / 2),
            Constraint::Percentage(w),
            Constraint::Percentage((100 - w) / 2),
        ])
        .split(v[1])[1]
}
