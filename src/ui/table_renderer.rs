// Table rendering for TableEngine. Reads engine state only; all mutation
// happens through the engine's operations.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState as WidgetState},
    Frame,
};

use crate::table::{PageItem, PaginationMetadata, TableEngine, TableRow, TableState};

const SPINNER: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];
const CHECKBOX_WIDTH: u16 = 3;

/// Presentation options that are not table state
#[derive(Debug, Clone)]
pub struct TableView<'a> {
    pub title: &'a str,
    pub empty_message: &'a str,
    pub show_row_numbers: bool,
    pub focused: bool,
    /// Animation frame for the loading spinner
    pub tick: usize,
}

/// Render the table (or its loading/empty placeholder) plus the paginator
pub fn render_table<T: TableRow>(f: &mut Frame, area: Rect, engine: &TableEngine<T>, view: &TableView) {
    let border_style = if view.focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(view.title.to_string());

    match engine.state() {
        TableState::Loading => {
            let frame = SPINNER[view.tick % SPINNER.len()];
            let loading = Paragraph::new(format!("{} Loading...", frame))
                .block(block)
                .style(Style::default().fg(Color::Yellow));
            f.render_widget(loading, area);
        }
        TableState::Empty => {
            let empty = Paragraph::new(view.empty_message.to_string())
                .block(block)
                .style(Style::default().fg(Color::Yellow));
            f.render_widget(empty, area);
        }
        TableState::Populated => {
            let (table_area, pager_area) = match engine.visible_pagination() {
                Some(_) => {
                    let chunks =
                        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).split(area);
                    (chunks[0], Some(chunks[1]))
                }
                None => (area, None),
            };

            render_rows(f, table_area, engine, view, block);

            if let (Some(meta), Some(pager_area)) = (engine.visible_pagination(), pager_area) {
                f.render_widget(Paragraph::new(paginator_line(meta)), pager_area);
            }
        }
    }
}

fn render_rows<T: TableRow>(
    f: &mut Frame,
    area: Rect,
    engine: &TableEngine<T>,
    view: &TableView,
    block: Block,
) {
    let (cursor_row, cursor_col) = engine.cursor();

    let header = build_header_row(engine, view, cursor_col);
    let rows: Vec<Row> = engine
        .data()
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let mut cells: Vec<Cell> = Vec::new();
            if engine.is_selectable() {
                cells.push(Cell::from(checkbox(engine.is_row_selected(row))));
            }
            if view.show_row_numbers {
                let number = row_number(engine.pagination(), idx);
                cells.push(
                    Cell::from(number.to_string()).style(Style::default().fg(Color::DarkGray)),
                );
            }
            for col in engine.columns() {
                let cell = Cell::from(col.display(row));
                cells.push(match col.style {
                    Some(style) => cell.style(style),
                    None => cell,
                });
            }

            let style = if engine.is_row_selected(row) {
                Style::default().fg(Color::LightGreen)
            } else {
                Style::default()
            };
            Row::new(cells).style(style)
        })
        .collect();

    let table = Table::new(rows, column_widths(engine, view))
        .header(header)
        .block(block)
        .column_spacing(1)
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = WidgetState::default();
    if view.focused {
        state.select(Some(cursor_row));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn build_header_row<'a, T: TableRow>(
    engine: &TableEngine<T>,
    view: &TableView,
    cursor_col: usize,
) -> Row<'a> {
    let mut cells: Vec<Cell> = Vec::new();

    if engine.is_selectable() {
        cells.push(Cell::from(checkbox(engine.all_displayed_selected())));
    }
    if view.show_row_numbers {
        cells.push(Cell::from("#").style(Style::default().fg(Color::Magenta)));
    }

    let sort = engine.sort();
    for (idx, col) in engine.columns().iter().enumerate() {
        let mut style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        if view.focused && idx == cursor_col {
            style = style.fg(Color::Yellow).add_modifier(Modifier::UNDERLINED);
        }
        cells.push(
            Cell::from(format!("{}{}", col.header, sort.indicator_for(&col.key))).style(style),
        );
    }

    Row::new(cells)
}

fn column_widths<T: TableRow>(engine: &TableEngine<T>, view: &TableView) -> Vec<Constraint> {
    let mut widths = Vec::new();
    if engine.is_selectable() {
        widths.push(Constraint::Length(CHECKBOX_WIDTH));
    }
    if view.show_row_numbers {
        widths.push(Constraint::Length(5));
    }
    for col in engine.columns() {
        widths.push(match col.width {
            Some(w) => Constraint::Length(w),
            None => Constraint::Fill(1),
        });
    }
    widths
}

/// 1-based row number continuing across pages
fn row_number(meta: Option<&PaginationMetadata>, idx: usize) -> u64 {
    let offset = meta.map_or(0, |m| u64::from(m.page.saturating_sub(1)) * u64::from(m.limit));
    offset + idx as u64 + 1
}

fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

/// "‹ Prev  1 … 4 [5] 6 … 10  Next ›   Showing 41 to 50 of 100 results"
pub fn paginator_line(meta: &PaginationMetadata) -> Line<'static> {
    let enabled = Style::default().fg(Color::Cyan);
    let disabled = Style::default().fg(Color::DarkGray);

    let mut spans = vec![Span::styled(
        "‹ Prev ",
        if meta.has_previous() { enabled } else { disabled },
    )];

    for item in meta.page_items() {
        let span = match item {
            PageItem::Page(n) if n == meta.page => Span::styled(
                format!(" [{}]", n),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            PageItem::Page(n) => Span::raw(format!(" {}", n)),
            PageItem::Ellipsis => Span::styled(" …", disabled),
        };
        spans.push(span);
    }

    spans.push(Span::styled(
        "  Next ›",
        if meta.has_next() { enabled } else { disabled },
    ));
    spans.push(Span::styled(
        format!("   {}", meta.range_label()),
        Style::default().fg(Color::Gray),
    ));

    Line::from(spans)
}
