//! 界面渲染
//!
//! 根据 DashboardState 快照绘制仪表盘：左列为状态/进度、指标、资源面板（文件 + Git），
//! 右列为终端消息流（按角色着色、按宽度换行）、输入框与页脚日志窗口。

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::core::{
    CommitStatus, DashboardState, FileStatus, LogLevel, OrchestratorStatus, Role, Trend,
};

/// 单条消息在 UI 中显示的最大字符数，超过折叠
const MAX_DISPLAY_CHARS: usize = 600;

fn truncate_for_display(content: &str) -> String {
    let chars: Vec<char> = content.chars().collect();
    if chars.len() <= MAX_DISPLAY_CHARS {
        return content.to_string();
    }
    let head: String = chars.iter().take(MAX_DISPLAY_CHARS).collect();
    format!("{}… [+{} chars]", head, chars.len() - MAX_DISPLAY_CHARS)
}

/// 绘制整个仪表盘；scroll_info 回传 (总行数, 视口高) 供 run_app 夹取滚动位置
pub fn draw(
    f: &mut Frame,
    state: &DashboardState,
    input_buffer: &str,
    conversation_scroll: usize,
    scroll_info: &mut (usize, usize),
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(38), Constraint::Percentage(62)])
        .split(f.area());

    draw_left_column(f, state, columns[0]);
    draw_right_column(f, state, input_buffer, conversation_scroll, scroll_info, columns[1]);
}

fn draw_left_column(f: &mut Frame, state: &DashboardState, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(6),
            Constraint::Min(6),
            Constraint::Min(7),
        ])
        .split(area);

    draw_status(f, state, rows[0]);
    draw_metrics(f, state, rows[1]);
    draw_files(f, state, rows[2]);
    draw_commits(f, state, rows[3]);
}

fn status_color(status: OrchestratorStatus) -> Color {
    match status {
        OrchestratorStatus::Idle => Color::DarkGray,
        OrchestratorStatus::Analyzing => Color::Cyan,
        OrchestratorStatus::Executing | OrchestratorStatus::StressTest => Color::Yellow,
        OrchestratorStatus::Wiring | OrchestratorStatus::Syncing => Color::Magenta,
        OrchestratorStatus::AwaitingDecision => Color::Green,
    }
}

fn draw_status(f: &mut Frame, state: &DashboardState, area: Rect) {
    let busy = !state.status.accepts_turn();
    let label = if busy {
        format!("{} · {}", state.status.label(), state.wiring_line)
    } else {
        state.status.label().to_string()
    };
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" AGENT STATUS "),
        )
        .gauge_style(Style::default().fg(status_color(state.status)))
        .percent(u16::from(state.progress))
        .label(label);
    f.render_widget(gauge, area);
}

fn trend_span(trend: Trend, change: i32) -> Span<'static> {
    match trend {
        Trend::Up => Span::styled(format!("▲ {change}%"), Style::default().fg(Color::Green)),
        Trend::Down => Span::styled(format!("▼ {change}%"), Style::default().fg(Color::Red)),
        Trend::Neutral => Span::styled("· 0%".to_string(), Style::default().fg(Color::DarkGray)),
    }
}

fn draw_metrics(f: &mut Frame, state: &DashboardState, area: Rect) {
    let lines: Vec<Line> = state
        .metrics
        .iter()
        .map(|m| {
            let mut spans = vec![
                Span::styled(format!("{:<17}", m.label), Style::default().fg(Color::Gray)),
                Span::styled(
                    m.value.clone(),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
            ];
            if let Some(ref unit) = m.unit {
                spans.push(Span::styled(
                    format!(" {unit}"),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            spans.push(Span::raw("  "));
            spans.push(trend_span(m.trend, m.change));
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" METRICS "));
    f.render_widget(paragraph, area);
}

fn file_status_span(status: FileStatus) -> Span<'static> {
    match status {
        FileStatus::Synced => Span::styled("synced", Style::default().fg(Color::Green)),
        FileStatus::Changed => Span::styled("changed", Style::default().fg(Color::Yellow)),
        FileStatus::Pending => Span::styled("pending", Style::default().fg(Color::DarkGray)),
    }
}

fn draw_files(f: &mut Frame, state: &DashboardState, area: Rect) {
    let title = if state.integration.drive_connected {
        " DRIVE (mounted) "
    } else {
        " DRIVE "
    };
    let lines: Vec<Line> = state
        .files
        .iter()
        .map(|file| {
            Line::from(vec![
                Span::styled(
                    format!("{}{}", file.path, file.name),
                    Style::default().fg(Color::White),
                ),
                Span::raw("  "),
                file_status_span(file.status),
                Span::styled(
                    format!("  {}", file.last_modified),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();
    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn commit_status_span(status: CommitStatus) -> Span<'static> {
    match status {
        CommitStatus::Deployed => Span::styled("deployed", Style::default().fg(Color::Green)),
        CommitStatus::Pending => Span::styled("pending", Style::default().fg(Color::Yellow)),
        CommitStatus::Failed => Span::styled("failed", Style::default().fg(Color::Red)),
    }
}

fn draw_commits(f: &mut Frame, state: &DashboardState, area: Rect) {
    let title = if state.integration.repo_connected {
        " GIT (connected) "
    } else {
        " GIT "
    };
    let lines: Vec<Line> = state
        .commits
        .iter()
        .map(|c| {
            Line::from(vec![
                Span::styled(c.hash.clone(), Style::default().fg(Color::Cyan)),
                Span::styled(format!(" {}", c.message), Style::default().fg(Color::White)),
                Span::styled(
                    format!(" ({}) ", c.branch),
                    Style::default().fg(Color::DarkGray),
                ),
                commit_status_span(c.status),
            ])
        })
        .collect();
    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn role_prefix(role: Role, is_error: bool) -> Span<'static> {
    if is_error {
        return Span::styled("SYS! ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));
    }
    match role {
        Role::User => Span::styled("YOU  ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Role::Model => Span::styled("ORCH ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Role::System => Span::styled("SYS  ", Style::default().fg(Color::Yellow)),
        Role::Function => Span::styled("EXEC ", Style::default().fg(Color::Magenta)),
    }
}

fn draw_right_column(
    f: &mut Frame,
    state: &DashboardState,
    input_buffer: &str,
    conversation_scroll: usize,
    scroll_info: &mut (usize, usize),
    area: Rect,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(8),
        ])
        .split(area);

    draw_conversation(f, state, conversation_scroll, scroll_info, rows[0]);
    draw_input(f, state, input_buffer, rows[1]);
    draw_logs(f, state, rows[2]);
}

fn draw_conversation(
    f: &mut Frame,
    state: &DashboardState,
    conversation_scroll: usize,
    scroll_info: &mut (usize, usize),
    area: Rect,
) {
    let mut lines: Vec<Line> = Vec::new();
    for msg in &state.messages {
        let text = truncate_for_display(&msg.text);
        let mut first = true;
        for part in text.lines() {
            if first {
                lines.push(Line::from(vec![
                    role_prefix(msg.role, msg.is_error),
                    Span::raw(part.to_string()),
                ]));
                first = false;
            } else {
                lines.push(Line::from(vec![
                    Span::raw("     "),
                    Span::raw(part.to_string()),
                ]));
            }
        }
        if first {
            // 空文本消息也要占一行，保持时间顺序可见
            lines.push(Line::from(role_prefix(msg.role, msg.is_error)));
        }
    }

    let viewport_height = area.height.saturating_sub(2) as usize;
    let total_lines = lines.len();
    *scroll_info = (total_lines, viewport_height);
    let scroll = conversation_scroll.min(total_lines.saturating_sub(viewport_height));

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" SPARTAN TERMINAL "))
        .wrap(Wrap { trim: false })
        .scroll((scroll as u16, 0));
    f.render_widget(paragraph, area);
}

fn draw_input(f: &mut Frame, state: &DashboardState, input_buffer: &str, area: Rect) {
    let locked = !state.status.accepts_turn();
    let (title, style) = if locked {
        (" INPUT (working…) ", Style::default().fg(Color::DarkGray))
    } else {
        (" INPUT · Enter 发送 · ^E 模拟事件 · ^L 清屏 · ^Q 退出 ", Style::default().fg(Color::White))
    };
    let paragraph = Paragraph::new(format!("> {input_buffer}"))
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(paragraph, area);
}

fn log_level_span(level: LogLevel) -> Span<'static> {
    match level {
        LogLevel::Success => Span::styled("SUCCESS", Style::default().fg(Color::Green)),
        LogLevel::Warn => Span::styled("WARN", Style::default().fg(Color::Yellow)),
        LogLevel::Info => Span::styled("INFO", Style::default().fg(Color::Blue)),
        LogLevel::Error => Span::styled("ERROR", Style::default().fg(Color::Red)),
    }
}

fn draw_logs(f: &mut Frame, state: &DashboardState, area: Rect) {
    let lines: Vec<Line> = state
        .logs
        .iter()
        .map(|log| {
            Line::from(vec![
                Span::styled(format!("[{}] ", log.timestamp), Style::default().fg(Color::DarkGray)),
                log_level_span(log.level),
                Span::styled(format!(" [{}] ", log.source), Style::default().fg(Color::Gray)),
                Span::styled(log.message.clone(), Style::default().fg(Color::White)),
            ])
        })
        .collect();
    let paragraph = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" SYSTEM LOGS · /var/log/spartan-orch.log "),
    );
    f.render_widget(paragraph, area);
}
