use crossterm::event;
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::io;

use crate::app::{Action, App, InputMode};
use crate::drag::BoardLayout;
use crate::id_gen::IdGenerator;
use crate::storage::BlobStore;
use crate::task::{Task, TaskPriority, TaskStatus};

/// Rows taken by one card: border, text, badge line, border.
const CARD_HEIGHT: u16 = 4;

const CURSOR: &str = "█";

pub fn run_app<B: Backend, S: BlobStore, G: IdGenerator>(
    terminal: &mut Terminal<B>,
    app: &mut App<S, G>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        if app.handle_event(event::read()?) == Action::Quit {
            return Ok(());
        }
    }
}

/// Renders the board and records the card and column rectangles so mouse
/// drags can be resolved against what is on screen.
pub fn draw<S: BlobStore, G: IdGenerator>(f: &mut Frame<'_>, app: &mut App<S, G>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_search(f, chunks[0], app);
    draw_add_bar(f, chunks[1], app);
    let layout = draw_board(f, chunks[2], app);
    draw_status(f, chunks[3], app);
    app.layout = layout;
}

fn input_block(title: &str, active: bool) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if active {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        })
}

fn input_line(text: &str, active: bool) -> Line<'static> {
    let mut spans = vec![Span::raw(text.to_string())];
    if active {
        spans.push(Span::styled(CURSOR, Style::default().fg(Color::Cyan)));
    }
    Line::from(spans)
}

fn draw_search<S: BlobStore, G: IdGenerator>(f: &mut Frame<'_>, area: Rect, app: &App<S, G>) {
    let active = app.mode == InputMode::Searching;
    let widget = Paragraph::new(input_line(&app.search, active))
        .block(input_block(" Kanban Board | Search [/] ", active));
    f.render_widget(widget, area);
}

fn draw_add_bar<S: BlobStore, G: IdGenerator>(f: &mut Frame<'_>, area: Rect, app: &App<S, G>) {
    let active = app.mode == InputMode::Adding;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(22)])
        .split(area);

    let input =
        Paragraph::new(input_line(&app.draft, active)).block(input_block(" New task [a] ", active));
    f.render_widget(input, chunks[0]);

    let selector = Paragraph::new(Line::from(Span::styled(
        app.draft_priority.label(),
        priority_style(app.draft_priority),
    )))
    .block(input_block(" Priority [Tab] ", active));
    f.render_widget(selector, chunks[1]);
}

fn draw_board<S: BlobStore, G: IdGenerator>(
    f: &mut Frame<'_>,
    area: Rect,
    app: &App<S, G>,
) -> BoardLayout {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    let views = app.board().views(&app.search);
    let mut layout = BoardLayout::default();

    for (status, column_area) in TaskStatus::ALL.into_iter().zip(columns.iter().copied()) {
        let tasks = views.column(status);
        let selected = app.selected_column == status;

        let block = Block::default()
            .title(Line::from(vec![
                Span::styled(
                    format!(" {} ", status.title()),
                    Style::default()
                        .fg(column_color(status))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("({}) ", tasks.len())),
            ]))
            .borders(Borders::ALL)
            .border_style(if selected {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            });
        let inner = block.inner(column_area);
        f.render_widget(block, column_area);
        layout.columns.push((status, column_area));

        let visible = usize::from((inner.height / CARD_HEIGHT).max(1));
        let offset = if selected {
            app.selected_row.saturating_sub(visible - 1)
        } else {
            0
        };

        let mut y = inner.y;
        for (row, task) in tasks.iter().enumerate().skip(offset).take(visible) {
            let height = CARD_HEIGHT.min(inner.bottom().saturating_sub(y));
            if height == 0 {
                break;
            }
            let card_area = Rect::new(inner.x, y, inner.width, height);
            draw_card(f, card_area, app, task, selected && row == app.selected_row);
            layout.cards.push((task.id.clone(), card_area));
            y += height;
        }
    }

    layout
}

fn draw_card<S: BlobStore, G: IdGenerator>(
    f: &mut Frame<'_>,
    area: Rect,
    app: &App<S, G>,
    task: &Task,
    selected: bool,
) {
    let border = if app.dragging() == Some(&task.id) {
        Color::Yellow
    } else if selected {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let text = match app.edit.as_ref().filter(|e| e.id == task.id) {
        Some(edit) => input_line(&edit.buffer, true),
        None => Line::from(Span::styled(
            task.text.clone(),
            Style::default().fg(Color::White),
        )),
    };

    let mut badges = vec![Span::styled(
        format!(" {} ", task.priority.as_str().to_uppercase()),
        priority_style(task.priority),
    )];
    if selected {
        for (i, to) in task.status.move_options().into_iter().enumerate() {
            badges.push(Span::styled(
                format!(" {}:{}", i + 1, to.move_label()),
                Style::default().fg(Color::Gray),
            ));
        }
    }

    let card = Paragraph::new(vec![text, Line::from(badges)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(card, area);
}

fn draw_status<S: BlobStore, G: IdGenerator>(f: &mut Frame<'_>, area: Rect, app: &App<S, G>) {
    let line = match &app.message {
        Some(message) => Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        None => Line::from(Span::styled(
            help_text(app.mode),
            Style::default().fg(Color::DarkGray),
        )),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn help_text(mode: InputMode) -> &'static str {
    match mode {
        InputMode::Normal => {
            "a add  / search  e edit  d delete  1/2 move  arrows select  drag to move  q quit"
        }
        InputMode::Adding => "Enter add  Tab priority  Esc cancel",
        InputMode::Searching => "Enter keep filter  Esc clear",
        InputMode::Editing => "Enter save  Esc cancel",
    }
}

fn column_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Todo => Color::Red,
        TaskStatus::InProgress => Color::Yellow,
        TaskStatus::Done => Color::Green,
    }
}

fn priority_style(priority: TaskPriority) -> Style {
    let (bg, fg) = match priority {
        TaskPriority::High => (Color::Red, Color::White),
        TaskPriority::Medium => (Color::Yellow, Color::Black),
        TaskPriority::Low => (Color::Green, Color::White),
    };
    Style::default().bg(bg).fg(fg).add_modifier(Modifier::BOLD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id_gen::SequentialIdGenerator;
    use crate::kanban_board::KanbanBoard;
    use crate::storage::{MemoryBlobStore, TaskRepository};
    use crate::task::TaskId;
    use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
    use ratatui::backend::TestBackend;
    use rstest::{fixture, rstest};

    type TestApp = App<MemoryBlobStore, SequentialIdGenerator>;

    #[fixture]
    fn app() -> TestApp {
        let mut board = KanbanBoard::with_ids(SequentialIdGenerator::new());
        board.add_task("Buy milk", TaskPriority::High).unwrap();
        board.add_task("Walk dog", TaskPriority::Low).unwrap();
        let done = board.add_task("File taxes", TaskPriority::Medium).unwrap().id.clone();
        board.move_task(&done, TaskStatus::Done);
        App::new(board, TaskRepository::new(MemoryBlobStore::new()))
    }

    fn render(app: &mut TestApp) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buf = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn center(area: Rect) -> (u16, u16) {
        (area.x + area.width / 2, area.y + area.height / 2)
    }

    #[rstest]
    fn renders_columns_cards_and_badges(mut app: TestApp) {
        let screen = render(&mut app);

        assert!(screen.contains("To Do (2)"));
        assert!(screen.contains("In Progress (0)"));
        assert!(screen.contains("Done (1)"));
        assert!(screen.contains("Buy milk"));
        assert!(screen.contains("HIGH"));
        assert!(screen.contains("1:→ In Progress"));
        assert!(screen.contains("2:→ Done"));
    }

    #[rstest]
    fn search_hides_non_matching_cards(mut app: TestApp) {
        app.search = "DOG".into();

        let screen = render(&mut app);

        assert!(screen.contains("Walk dog"));
        assert!(!screen.contains("Buy milk"));
        assert!(screen.contains("To Do (1)"));
    }

    #[rstest]
    fn draw_records_hit_regions(mut app: TestApp) {
        render(&mut app);

        assert_eq!(app.layout.columns.len(), 3);
        let ids: Vec<&str> = app.layout.cards.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["task-1", "task-2", "task-3"]);
    }

    #[rstest]
    fn dragging_a_rendered_card_moves_it(mut app: TestApp) {
        render(&mut app);
        let card = app.layout.cards[0].1;
        let in_progress = app.layout.columns[1].1;
        let mouse = |kind, (column, row): (u16, u16)| MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), center(card)));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), center(in_progress)));

        assert_eq!(
            app.board().get(&TaskId::new("task-1")).unwrap().status,
            TaskStatus::InProgress
        );
        assert!(render(&mut app).contains("In Progress (1)"));
    }

    #[rstest]
    fn validation_message_replaces_help(mut app: TestApp) {
        app.message = Some("Please enter a task!".into());

        assert!(render(&mut app).contains("Please enter a task!"));
    }
}
