use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};
use tasks_tracker_app::TaskStore;
use tasks_tracker_core::{EmptyReason, Task, tag_info};

use super::super::constants::{TASK_LABEL_PREFIX, TASK_TABLE_HIGHLIGHT_SYMBOL};
use super::super::view::Ui;
use super::util::{badge, hex_color, truncate_with_ellipsis};

const TITLE_MAX_GRAPHEMES: usize = 48;

const NO_TASKS_TEXT: &str = "Looks like there are no tasks to display yet! Why not add some tasks and get started?";
const NO_MATCHES_TEXT: &str = "No task matches the current filter";

/// `TASK-{row}` label shown for a table row.
pub(in crate::tui) fn task_label(row: usize) -> String {
    format!("{TASK_LABEL_PREFIX}{row}")
}

fn tag_spans(task: &Task) -> Line<'_> {
    let mut spans = Vec::with_capacity(task.tags.len() * 2);
    for (idx, tag) in task.tags.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw(" "));
        }
        let style = tag_info(tag).map_or_else(Style::default, |info| Style::default().fg(hex_color(info.color)));
        spans.push(Span::styled(tag.as_str(), style));
    }
    Line::from(spans)
}

fn task_row(row: usize, task: &Task) -> Row<'_> {
    let status = task.status.meta();
    let priority = task.priority.meta();
    Row::new(vec![
        Cell::from(Span::styled(task_label(row), Style::default().fg(Color::DarkGray))),
        Cell::from(Span::styled(
            truncate_with_ellipsis(&task.title, TITLE_MAX_GRAPHEMES),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Cell::from(tag_spans(task)),
        Cell::from(Span::styled(badge(status), Style::default().fg(hex_color(status.color)))),
        Cell::from(Span::styled(
            badge(priority),
            Style::default().fg(hex_color(priority.color)),
        )),
    ])
}

impl<S> Ui<S>
where
    S: TaskStore + Send + Sync + 'static,
{
    pub(in crate::tui) fn draw_task_table(&self, f: &mut Frame<'_>, area: Rect) {
        let visibility = self.app.visibility();
        let block = Block::default().title("Tasks").borders(Borders::ALL);

        if let Some(reason) = visibility.empty_reason() {
            let text = match reason {
                EmptyReason::NoTasks => NO_TASKS_TEXT,
                EmptyReason::NoMatches => NO_MATCHES_TEXT,
            };
            let empty = Paragraph::new(Line::from(Span::styled(text, Style::default().fg(Color::DarkGray))))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block);
            f.render_widget(empty, area);
            return;
        }

        let rows: Vec<Row<'_>> = visibility
            .visible_tasks(&self.app.tasks)
            .enumerate()
            .map(|(row, task)| task_row(row, task))
            .collect();
        let header = Row::new(["Task", "Title", "Tags", "Status", "Priority"])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        let widths = [
            Constraint::Length(9),
            Constraint::Fill(1),
            Constraint::Length(28),
            Constraint::Length(16),
            Constraint::Length(12),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol(TASK_TABLE_HIGHLIGHT_SYMBOL);
        let mut state = TableState::default();
        state.select(Some(visibility.selected_index()));
        f.render_stateful_widget(table, area, &mut state);
    }
}
