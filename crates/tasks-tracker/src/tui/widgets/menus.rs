use ratatui::{
    Frame,
    layout::{Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
};
use tasks_tracker_app::TaskStore;

use super::super::constants::MENU_WIDTH;
use super::super::handlers::navigation::ROW_ACTIONS;
use super::super::view::{FilterMenuKind, Ui};
use super::util::dropdown_area;

/// Rows taken by the table border and header above the first task.
const TABLE_BODY_OFFSET: u16 = 2;

fn menu_height(entries: usize) -> u16 {
    u16::try_from(entries).map_or(u16::MAX, |len| len.saturating_add(2))
}

fn menu_list(title: String, items: Vec<ListItem<'_>>) -> List<'_> {
    List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .style(Style::default().bg(Color::Black)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
}

impl<S> Ui<S>
where
    S: TaskStore + Send + Sync + 'static,
{
    /// View / Edit / Delete next to the selected row of the table in `table_area`.
    pub(in crate::tui) fn draw_row_menu(&self, f: &mut Frame<'_>, table_area: Rect, selected: usize) {
        let row = u16::try_from(self.app.visibility().selected_index()).unwrap_or(u16::MAX);
        let anchor = Rect {
            x: table_area.x.saturating_add(2),
            y: table_area.y.saturating_add(TABLE_BODY_OFFSET).saturating_add(row),
            width: 1,
            height: 1,
        };
        let area = dropdown_area(table_area, anchor, MENU_WIDTH, menu_height(ROW_ACTIONS.len()));

        let items: Vec<ListItem<'_>> = ROW_ACTIONS.iter().map(|action| ListItem::new(*action)).collect();
        let title = self
            .app
            .selected_task()
            .map_or_else(|| "Actions".to_owned(), |task| task.title.clone());
        let mut state = ListState::default();
        state.select(Some(selected));

        f.render_widget(Clear, area);
        f.render_stateful_widget(menu_list(title, items), area, &mut state);
    }

    /// Checkbox list under the toolbar button of `kind`.
    pub(in crate::tui) fn draw_filter_menu(
        &self,
        f: &mut Frame<'_>,
        toolbar_area: Rect,
        kind: FilterMenuKind,
        selected: usize,
    ) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(Self::toolbar_constraints())
            .split(toolbar_area);
        let anchor = match kind {
            FilterMenuKind::Status => columns[1],
            FilterMenuKind::Priority => columns[2],
        };
        let area = dropdown_area(f.area(), anchor, MENU_WIDTH, menu_height(kind.entry_count()));

        let items: Vec<ListItem<'_>> = (0..kind.entry_count())
            .map(|index| {
                let label = kind.label(index);
                if index + 1 == kind.entry_count() {
                    return ListItem::new(Line::from(Span::styled(label, Style::default().fg(Color::DarkGray))));
                }
                let mark = if self.filter_item_checked(kind, index) {
                    "[x] "
                } else {
                    "[ ] "
                };
                ListItem::new(Line::from(vec![Span::raw(mark), Span::raw(label)]))
            })
            .collect();
        let mut state = ListState::default();
        state.select(Some(selected));

        f.render_widget(Clear, area);
        f.render_stateful_widget(menu_list(kind.title().to_owned(), items), area, &mut state);
    }
}
