use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use tasks_tracker_app::{ModalKind, Route, TaskStore};

use super::super::view::{FilterMenuKind, Focus, Menu, Message, Ui};
use super::util::popup_area;

const APP_TITLE: &str = "Tasks Tracker";

impl<S> Ui<S>
where
    S: TaskStore + Send + Sync + 'static,
{
    pub(in crate::tui) fn draw_header(&self, f: &mut Frame<'_>, area: Rect) {
        let name = self
            .app
            .identity()
            .map_or("there", |identity| identity.name.as_str());
        let lines = vec![
            Line::from(vec![
                Span::raw("Welcome, "),
                Span::styled(
                    name,
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::raw("!"),
            ]),
            Line::from(Span::styled(
                "Here's your current tasks.",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let header = Paragraph::new(lines).block(
            Block::default()
                .title(Span::styled(APP_TITLE, Style::default().fg(Color::Yellow)))
                .title_bottom(Line::from(self.user_label()).right_aligned())
                .borders(Borders::ALL),
        );
        f.render_widget(header, area);
    }

    pub(in crate::tui) fn draw_toolbar(&self, f: &mut Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(Self::toolbar_constraints())
            .split(area);

        let visibility = self.app.visibility();
        let editing = self.focus == Focus::TitleInput && self.menu.is_none();
        let input = if visibility.title_input().is_empty() && !editing {
            Line::from(Span::styled("Filter tasks...", Style::default().fg(Color::DarkGray)))
        } else {
            let mut spans = vec![Span::raw(visibility.title_input().to_owned())];
            if editing {
                spans.push(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
            }
            if visibility.title_pending() {
                spans.push(Span::styled(" ...", Style::default().fg(Color::DarkGray)));
            }
            Line::from(spans)
        };
        let border = if editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let title_box = Paragraph::new(input).block(
            Block::default()
                .title("Title [/]")
                .borders(Borders::ALL)
                .border_style(border),
        );
        f.render_widget(title_box, columns[0]);

        self.draw_filter_button(f, columns[1], FilterMenuKind::Status, "[s]");
        self.draw_filter_button(f, columns[2], FilterMenuKind::Priority, "[p]");
    }

    pub(in crate::tui) const fn toolbar_constraints() -> [Constraint; 3] {
        [
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ]
    }

    fn draw_filter_button(&self, f: &mut Frame<'_>, area: Rect, kind: FilterMenuKind, key_hint: &str) {
        let open = matches!(self.menu, Some(Menu::Filter { kind: open, .. }) if open == kind);
        let content = self.filter_summary(kind).map_or_else(
            || Line::from(Span::styled("+ any", Style::default().fg(Color::DarkGray))),
            |summary| Line::from(Span::styled(summary, Style::default().fg(Color::Yellow))),
        );
        let border = if open {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let button = Paragraph::new(content).block(
            Block::default()
                .title(format!("{} {key_hint}", kind.title()))
                .borders(Borders::ALL)
                .border_style(border),
        );
        f.render_widget(button, area);
    }

    pub(in crate::tui) fn draw_status(&self, f: &mut Frame<'_>, instructions_area: Rect, message_area: Rect) {
        let instructions = Paragraph::new(self.instructions())
            .block(Block::default().title("Keys").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(instructions, instructions_area);

        let message = Paragraph::new(self.status_text())
            .block(Block::default().title("Status").borders(Borders::ALL))
            .style(self.status_style());
        f.render_widget(message, message_area);
    }

    pub(in crate::tui) fn instructions(&self) -> &'static str {
        if self.modals.is_submitting() {
            return "Saving...";
        }
        match (self.modals.kind(), self.menu, self.focus) {
            (Some(ModalKind::View), _, _) => "e: edit  d: delete  Esc: close",
            (Some(ModalKind::DeleteConfirm), _, _) => "y/Enter: delete  n: back  Esc: cancel",
            (Some(_), _, _) => {
                "Tab/Up/Down: field  Left/Right: choose  Space: toggle tag  Enter/Ctrl+S: save  Esc: cancel"
            }
            (None, Some(Menu::RowActions { .. }), _) => "Up/Down: move  Enter: open  Esc: close",
            (None, Some(Menu::Filter { .. }), _) => "Up/Down: move  Space/Enter: toggle  Esc: close",
            (None, None, Focus::TitleInput) => "Type to filter  Enter: apply now  Esc/Tab: back to table",
            (None, None, Focus::Table) => {
                "j/k: move  Enter: actions  v/e/d: view/edit/delete  n: add task  /: filter title  s/p: status/priority  r: reload  L: sign out  q: quit"
            }
        }
    }

    fn status_text(&self) -> &str {
        self.message.as_ref().map_or("", |msg| msg.text.as_str())
    }

    fn status_style(&self) -> Style {
        self.message.as_ref().map_or_else(Style::default, Message::style)
    }

    pub(in crate::tui) fn draw_sign_in(&self, f: &mut Frame<'_>) {
        let area = popup_area(f.area(), (50, 40), (40, 10));
        let callback = match &self.route {
            Route::SignIn {
                callback_url: Some(url),
            } => url.as_str(),
            _ => "/~",
        };
        let mut lines = vec![
            Line::from(Span::styled(
                "Sign in to continue",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::raw("User id: "),
                Span::styled(
                    format!("{}_", self.sign_in_input),
                    Style::default().fg(Color::Yellow),
                ),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                format!("Enter: sign in and continue to {callback}  Esc: quit"),
                Style::default().fg(Color::DarkGray),
            )),
        ];
        if let Some(msg) = &self.message {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(msg.text.clone(), msg.style())));
        }

        let block = Block::default()
            .title(APP_TITLE)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        f.render_widget(Clear, area);
        f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
    }
}
