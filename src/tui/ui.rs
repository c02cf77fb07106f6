use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{DraftField, LiveEditorApp};

pub fn draw(frame: &mut Frame, app: &LiveEditorApp) {
    // Main horizontal split: 1/3 left, 2/3 right
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3), // Left pane: update list
            Constraint::Ratio(2, 3), // Right pane: selected update
        ])
        .split(frame.area());

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Article title
            Constraint::Min(0),    // Updates
            Constraint::Length(1), // Key hints
        ])
        .split(main_chunks[0]);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Update title
            Constraint::Min(0),    // Update detail
            Constraint::Length(1), // Status
        ])
        .split(main_chunks[1]);

    render_header(frame, app, left_chunks[0]);
    render_update_list(frame, app, left_chunks[1]);
    render_hints(frame, app, left_chunks[2]);

    render_update_title(frame, app, right_chunks[0]);
    render_update_detail(frame, app, right_chunks[1]);
    render_status(frame, app, right_chunks[2]);

    if app.draft_active() {
        render_draft(frame, app);
    }

    if app.show_help {
        render_help(frame);
    }
}

fn render_header(frame: &mut Frame, app: &LiveEditorApp, area: Rect) {
    let form = &app.form;
    let key_count = form.updates.key_events().len();
    let title = format!(" {} [{}] ", form.brand.display_name(), form.category);
    let stats = format!(
        " {} | {} updates, {} key",
        form.title,
        form.updates.len(),
        key_count
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let paragraph = Paragraph::new(stats).style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, inner);
}

fn render_update_list(frame: &mut Frame, app: &LiveEditorApp, area: Rect) {
    let items: Vec<ListItem> = app
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let update = &entry.update;
            let marker = if update.is_key { "★ " } else { "  " };
            let time = update.content_published_at.format("%H:%M").to_string();
            let line = Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Yellow)),
                Span::styled(format!("{:>2}. ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(format!("[{time}] "), Style::default().fg(Color::Blue)),
                Span::styled(update.content_title.as_str(), Style::default().fg(Color::White)),
            ]);
            ListItem::new(line)
        })
        .collect();

    let title = match app.form.errors.get("content") {
        Some(message) => format!(" Updates - {message} "),
        None => " Updates ".to_string(),
    };

    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !app.entries().is_empty() {
        state.select(Some(app.selected_index));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_hints(frame: &mut Frame, app: &LiveEditorApp, area: Rect) {
    let hints = if app.is_submitting {
        "Submitting..."
    } else {
        "a:add  e:edit  x:key  J/K:move  d:delete  s:submit  ?:help"
    };

    let paragraph = Paragraph::new(hints).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

fn render_update_title(frame: &mut Frame, app: &LiveEditorApp, area: Rect) {
    let title = app
        .selected_entry()
        .map(|e| e.update.content_title.as_str())
        .unwrap_or("No updates yet, press 'a' to add one");

    let block = Block::default()
        .title(" Update ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let paragraph = Paragraph::new(title)
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn render_update_detail(frame: &mut Frame, app: &LiveEditorApp, area: Rect) {
    let width = area.width.saturating_sub(2).max(20) as usize;
    let content = match app.selected_entry() {
        Some(entry) => {
            let update = &entry.update;
            let mut text = String::new();
            if !update.content_description.is_empty() {
                text.push_str(&update.content_description);
                text.push_str("\n\n");
            }
            text.push_str(&update.detail_text(width));
            text
        }
        None => String::new(),
    };

    let block = Block::default()
        .title(" Details ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn render_status(frame: &mut Frame, app: &LiveEditorApp, area: Rect) {
    let style = if app.form.errors.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Red)
    };
    let paragraph = Paragraph::new(app.status.as_str()).style(style);
    frame.render_widget(paragraph, area);
}

fn render_draft(frame: &mut Frame, app: &LiveEditorApp) {
    let area = centered_rect(70, 60, frame.area());
    let title = if app.editing.is_some() {
        " Edit update (Tab: next field, Enter: save, Alt+Enter: newline, Esc: cancel) "
    } else {
        " New update (Tab: next field, Enter: add, Alt+Enter: newline, Esc: cancel) "
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    let fields = [
        (DraftField::Title, app.draft_title.as_str(), chunks[0]),
        (DraftField::Description, app.draft_description.as_str(), chunks[1]),
        (DraftField::Detail, app.editor.content(), chunks[2]),
    ];
    for (field, value, area) in fields {
        let active = app.draft_field == Some(field);
        let border = if active { Color::Yellow } else { Color::DarkGray };
        let text = if active {
            format!("{value}_")
        } else {
            value.to_string()
        };
        let paragraph = Paragraph::new(text)
            .block(
                Block::default()
                    .title(format!(" {} ", field.label()))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border)),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(50, 60, frame.area());

    let help_text = [
        "",
        " Navigation:",
        "   j / ↓    Move down",
        "   k / ↑    Move up",
        "   < / >    First / last update",
        "",
        " Updates:",
        "   a        Add update",
        "   e        Edit selected update",
        "   x        Toggle key event",
        "   J / K    Move update down / up",
        "   d        Delete update",
        "",
        " Article:",
        "   s        Submit article",
        "",
        " General:",
        "   ?        Toggle this help",
        "   q        Quit",
        "",
        " Press any key to close",
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_text.join("\n"))
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use ratatui::{backend::TestBackend, Terminal};

    use crate::editor::editor_channel;
    use crate::forms::{ArticleForm, UpdateDraft};
    use crate::models::Brand;

    #[test]
    fn renders_updates_and_help() {
        let mut form = ArticleForm::new(Brand::Ghanascore);
        form.title = "Live: Test Match".to_string();
        form.is_live = true;
        form.updates
            .add(UpdateDraft::new("Kick-off", "<p>Underway</p>"))
            .unwrap();
        let (editor, _init) = editor_channel();
        let mut app = LiveEditorApp::new(form, editor, Duration::from_millis(10));
        app.show_help = true;

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| draw(frame, &app)).unwrap();
        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("Kick-off"));
        assert!(rendered.contains("Toggle key event"));
    }
}
