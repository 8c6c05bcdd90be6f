use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use tasks_tracker_app::{ActiveModal, ModalKind, TaskForm, TaskStore};
use tasks_tracker_core::{DisplayMeta, KNOWN_TAGS, Task, tag_info};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use super::super::constants::{
    CONFIRM_HEIGHT, CONFIRM_MIN_WIDTH, MODAL_HEIGHT_PERCENT, MODAL_MIN_HEIGHT, MODAL_MIN_WIDTH, MODAL_WIDTH_PERCENT,
};
use super::super::view::{FormCursor, FormField, Ui};
use super::task_table::task_label;
use super::util::{badge, hex_color, popup_area};

fn modal_block(title: String, closable: bool) -> Block<'static> {
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));
    if closable {
        block.title_bottom(Line::from("Esc: close").right_aligned())
    } else {
        block
    }
}

fn field_label(name: &str, focused: bool) -> Span<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let marker = if focused { "> " } else { "  " };
    Span::styled(format!("{marker}{name}: "), style)
}

fn placeholder(text: &str) -> Span<'_> {
    Span::styled(text, Style::default().fg(Color::DarkGray))
}

fn text_value<'a>(value: &'a str, hint: &'a str, focused: bool) -> Vec<Span<'a>> {
    let mut spans = if value.is_empty() && !focused {
        vec![placeholder(hint)]
    } else {
        vec![Span::raw(value)]
    };
    if focused {
        spans.push(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
    }
    spans
}

fn meta_span(meta: DisplayMeta) -> Span<'static> {
    Span::styled(badge(meta), Style::default().fg(hex_color(meta.color)))
}

fn tag_choices(form: &TaskForm, cursor: FormCursor) -> Vec<Span<'static>> {
    let focused = cursor.field == FormField::Tags;
    let mut spans = Vec::new();
    for (idx, tag) in KNOWN_TAGS.iter().enumerate() {
        let checked = form.tags.iter().any(|chosen| chosen == tag.name);
        let mut style = Style::default().fg(hex_color(tag.color));
        if focused && idx == cursor.tag {
            style = style.add_modifier(Modifier::REVERSED);
        }
        let mark = if checked { "[x]" } else { "[ ]" };
        spans.push(Span::styled(format!("{mark} {}", tag.name), style));
        spans.push(Span::raw(" "));
    }
    if form.tags.is_empty() && !focused {
        return vec![placeholder("Choose tags")];
    }
    spans
}

fn form_lines<'a>(form: &'a TaskForm, cursor: FormCursor, active: &ActiveModal) -> Vec<Line<'a>> {
    let focus = |field: FormField| cursor.field == field;
    let mut title = vec![field_label("Title", focus(FormField::Title))];
    title.extend(text_value(&form.title, "Enter task title", focus(FormField::Title)));
    let mut description = vec![field_label("Description", focus(FormField::Description))];
    description.extend(text_value(
        &form.description,
        "Enter task description",
        focus(FormField::Description),
    ));
    let mut tags = vec![field_label("Tags", focus(FormField::Tags))];
    tags.extend(tag_choices(form, cursor));

    let mut lines = vec![Line::from(title)];
    if let Some(err) = form.error() {
        lines.push(Line::from(Span::styled(
            format!("  {err}"),
            Style::default().fg(Color::Red),
        )));
    }
    lines.extend([Line::from(""), Line::from(description), Line::from(""), Line::from(tags)]);

    let priority_hint = match active {
        ActiveModal::Edit {
            current_status,
            current_priority,
            ..
        } => {
            let status = form.status.map_or_else(
                || placeholder_owned(format!("Keep current ({})", current_status.label())),
                |status| meta_span(status.meta()),
            );
            lines.push(Line::from(""));
            lines.push(Line::from(vec![field_label("Status", focus(FormField::Status)), status]));
            format!("Keep current ({})", current_priority.label())
        }
        _ => "Low (default)".to_owned(),
    };
    let priority = form
        .priority
        .map_or_else(|| placeholder_owned(priority_hint), |priority| meta_span(priority.meta()));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        field_label("Priority", focus(FormField::Priority)),
        priority,
    ]));
    lines
}

fn placeholder_owned(text: String) -> Span<'static> {
    Span::styled(text, Style::default().fg(Color::DarkGray))
}

fn timestamp(at: OffsetDateTime) -> Span<'static> {
    placeholder_owned(at.format(&Rfc3339).unwrap_or_else(|_| "-".to_owned()))
}

fn detail_lines(task: &Task) -> Vec<Line<'_>> {
    let mut tags: Vec<Span<'_>> = vec![field_label("Tags", false)];
    if task.tags.is_empty() {
        tags.push(placeholder("none"));
    }
    for tag in &task.tags {
        let style = tag_info(tag)
            .map_or_else(Style::default, |info| Style::default().fg(hex_color(info.color)));
        tags.push(Span::styled(format!("{tag} "), style));
    }
    let description = if task.description.is_empty() {
        placeholder("No description")
    } else {
        Span::raw(task.description.as_str())
    };
    vec![
        Line::from(vec![field_label("Title", false), Span::raw(task.title.as_str())]),
        Line::from(""),
        Line::from(vec![field_label("Description", false), description]),
        Line::from(""),
        Line::from(tags),
        Line::from(vec![field_label("Status", false), meta_span(task.status.meta())]),
        Line::from(vec![field_label("Priority", false), meta_span(task.priority.meta())]),
        Line::from(""),
        Line::from(vec![field_label("Created", false), timestamp(task.created_at)]),
        Line::from(vec![field_label("Updated", false), timestamp(task.updated_at)]),
    ]
}

impl<S> Ui<S>
where
    S: TaskStore + Send + Sync + 'static,
{
    fn modal_area(area: Rect) -> Rect {
        popup_area(
            area,
            (MODAL_WIDTH_PERCENT, MODAL_HEIGHT_PERCENT),
            (MODAL_MIN_WIDTH, MODAL_MIN_HEIGHT),
        )
    }

    fn submitting_line(&self) -> Option<Line<'static>> {
        self.modals.is_submitting().then(|| {
            Line::from(Span::styled(
                format!("{} Saving...", self.loading_frame()),
                Style::default().fg(Color::Yellow),
            ))
        })
    }

    fn notice_line(&self) -> Option<Line<'_>> {
        self.modals
            .notice()
            .map(|notice| Line::from(Span::styled(notice, Style::default().fg(Color::Red))))
    }

    pub(in crate::tui) fn draw_form_modal(&self, f: &mut Frame<'_>) {
        let (Some(active), Some(form)) = (self.modals.active(), self.modals.form()) else {
            return;
        };
        let title = match active.index() {
            Some(row) if active.kind() == ModalKind::Edit => format!("Edit {}", task_label(row)),
            _ => "Add Task".to_owned(),
        };

        let mut lines = form_lines(form, self.form_cursor, active);
        lines.push(Line::from(""));
        lines.extend(self.notice_line());
        lines.extend(self.submitting_line());
        if !self.modals.is_submitting() {
            let action = if active.kind() == ModalKind::Edit {
                "Enter: update"
            } else {
                "Enter: add task"
            };
            lines.push(Line::from(placeholder(action)));
        }

        let area = Self::modal_area(f.area());
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(lines)
                .block(modal_block(title, self.modals.can_dismiss()))
                .wrap(Wrap { trim: false }),
            area,
        );
    }

    pub(in crate::tui) fn draw_view_modal(&self, f: &mut Frame<'_>) {
        let Some(active) = self.modals.active() else {
            return;
        };
        let title = active.index().map_or_else(|| "Task".to_owned(), task_label);
        let mut lines = active.task_id().and_then(|id| self.app.task(id)).map_or_else(
            || vec![Line::from(placeholder("Task no longer exists"))],
            detail_lines,
        );
        lines.push(Line::from(""));
        lines.push(Line::from(placeholder("e: edit  d: delete")));

        let area = Self::modal_area(f.area());
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(lines)
                .block(modal_block(title, self.modals.can_dismiss()))
                .wrap(Wrap { trim: false }),
            area,
        );
    }

    pub(in crate::tui) fn draw_delete_modal(&self, f: &mut Frame<'_>) {
        let Some(active) = self.modals.active() else {
            return;
        };
        let label = active.index().map_or_else(|| "this task".to_owned(), task_label);
        let mut lines = vec![
            Line::from(format!("Are you sure you want to delete {label}?")),
            Line::from(""),
        ];
        lines.extend(self.notice_line());
        lines.push(self.submitting_line().unwrap_or_else(|| {
            Line::from(vec![
                Span::styled("y: Yes", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
                Span::raw("   "),
                Span::styled("n: No", Style::default().fg(Color::Green)),
            ])
        }));

        let area = popup_area(f.area(), (40, 0), (CONFIRM_MIN_WIDTH, CONFIRM_HEIGHT));
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(lines)
                .block(modal_block(format!("Delete {label}"), self.modals.can_dismiss()))
                .wrap(Wrap { trim: true }),
            area,
        );
    }
}
