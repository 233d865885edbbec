use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use crate::app::App;
use crate::state::ChatRole;

const HELP_LABEL: &str = " Help ";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, toolbar, chat, status, input, footer
    let [header_area, toolbar_area, chat_area, status_area, input_area, footer_area] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(area);

    render_header(frame, header_area);
    render_toolbar(app, frame, toolbar_area);
    render_chat(app, frame, chat_area);
    render_status(app, frame, status_area);
    render_input(app, frame, input_area);
    render_footer(frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Research Coach ", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_toolbar(app: &mut App, frame: &mut Frame, area: Rect) {
    let explain_label = format!(" {} ", app.status.explain_label());

    let [help_area, _, explain_area, _] = Layout::horizontal([
        Constraint::Length(HELP_LABEL.chars().count() as u16),
        Constraint::Length(1),
        Constraint::Length(explain_label.chars().count() as u16),
        Constraint::Min(0),
    ])
    .areas(area);

    // Store button areas for mouse hit-testing
    app.help_button_area = Some(help_area);
    app.explain_button_area = Some(explain_area);

    let button_style = Style::default().bg(Color::Blue).fg(Color::White);
    let pressed_style = Style::default()
        .bg(Color::Green)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD);

    frame.render_widget(Paragraph::new(HELP_LABEL).style(button_style), help_area);
    frame.render_widget(
        Paragraph::new(explain_label).style(if app.status.explain_pressed {
            pressed_style
        } else {
            button_style
        }),
        explain_area,
    );
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);

    // Inner size minus borders, for scroll calculations
    let resized = app.chat_height != area.height.saturating_sub(2)
        || app.chat_width != area.width.saturating_sub(2);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);
    if resized {
        app.scroll_chat_to_bottom();
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} ", app.client.base_url()));

    let chat = chat_paragraph(app)
        .block(block)
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

/// The chat log as rendered, without the border. Scroll math measures this too.
pub fn chat_paragraph(app: &App) -> Paragraph<'static> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    for msg in &app.messages {
        match msg.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                lines.extend(msg.text.split('\n').map(|l| Line::from(l.to_string())));
            }
            ChatRole::Bot => {
                lines.push(Line::from(Span::styled(
                    "Coach:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                lines.extend(msg.text.split('\n').map(|l| Line::from(l.to_string())));
            }
            ChatRole::Meta => {
                let style = Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC);
                lines.extend(
                    msg.text
                        .split('\n')
                        .map(|l| Line::from(Span::styled(format!("» {}", l), style))),
                );
            }
        }
        lines.push(Line::default());
    }

    if app.pending > 0 {
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Waiting{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false })
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let status = Paragraph::new(format!(" {}", app.status.text))
        .style(Style::default().fg(Color::White).bg(Color::Black));
    frame.render_widget(status, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Message ");

    // Horizontal scroll to keep the cursor visible (inner width excludes borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, area);

    let cursor_x = (cursor_pos - scroll_offset) as u16;
    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}

fn render_footer(frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = Line::from(vec![
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" F1 ", key_style),
        Span::styled(" help ", label_style),
        Span::styled(" F2 ", key_style),
        Span::styled(" explain ", label_style),
        Span::styled(" PgUp/PgDn ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    let footer = Paragraph::new(hints).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::CoachClient;
    use crate::state::SessionState;
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_render_shows_intro_status_and_buttons() {
        let mut app = App::new(CoachClient::new("http://127.0.0.1:5000").unwrap());
        app.update_status(&SessionState {
            topic: Some("physics".to_string()),
            word_count: Some(42),
            notes: Vec::new(),
            explain: true,
        });

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        let text = buffer_text(&terminal);

        assert!(text.contains("Coach:"));
        assert!(text.contains("Research Coach. Start with"));
        assert!(text.contains("Session: physics, 42 words"));
        assert!(text.contains("Explain: On"));
        assert!(text.contains(" Help "));
        assert!(app.help_button_area.is_some());
        assert!(app.explain_button_area.is_some());
    }

    #[test]
    fn test_long_wrapped_reply_tail_is_visible() {
        let mut app = App::new(CoachClient::new("http://127.0.0.1:5000").unwrap());
        let mut terminal = Terminal::new(TestBackend::new(30, 16)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        // Words too long to share a line force word wrapping
        let reply = "aaaaaaaaaaaaaaa bbbbbbbbbbbbbbb ccccccccccccccc ddddddddddddddd \
                     eeeeeeeeeeeeeee fffffffffffffff ZZEND";
        app.add_message(ChatRole::Meta, "explain mode: on");
        app.add_message(ChatRole::Bot, reply);
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("ZZEND"), "newest reply cut off:\n{}", text);
        assert!(text.contains("fffffffffffffff"));

        // Scrolling down cannot go past the end, and can always reach it
        app.scroll_chat_up(100);
        app.scroll_chat_down(100);
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        assert!(buffer_text(&terminal).contains("ZZEND"));
    }

    #[test]
    fn test_line_count_includes_meta_prefix() {
        let mut app = App::new(CoachClient::new("http://127.0.0.1:5000").unwrap());
        app.messages.clear();
        app.chat_width = 10;
        // "» " pushes this 9-char line past 10 columns
        app.add_message(ChatRole::Meta, "explainon");
        // two wrapped lines plus the blank separator
        assert_eq!(app.chat_line_count(), 3);
    }
}
