use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::table::{TableEngine, TableInteraction, TableRow};

/// What a key press means for a focused table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKey {
    Interact(TableInteraction),
    Move { rows: isize, cols: isize },
    Unhandled,
}

/// Map a key to a table interaction at the current cursor.
///
/// Space is the checkbox and Enter is the row click, so a single key press
/// can only ever be one of the two.
pub fn table_key<T: TableRow>(engine: &TableEngine<T>, key: KeyEvent) -> TableKey {
    let (row, col) = engine.cursor();
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return TableKey::Unhandled;
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => TableKey::Move { rows: -1, cols: 0 },
        KeyCode::Down | KeyCode::Char('j') => TableKey::Move { rows: 1, cols: 0 },
        KeyCode::Left | KeyCode::Char('h') => TableKey::Move { rows: 0, cols: -1 },
        KeyCode::Right | KeyCode::Char('l') => TableKey::Move { rows: 0, cols: 1 },
        KeyCode::Home => TableKey::Move {
            rows: -(engine.data().len() as isize),
            cols: 0,
        },
        KeyCode::End => TableKey::Move {
            rows: engine.data().len() as isize,
            cols: 0,
        },
        KeyCode::Char(' ') if !engine.data().is_empty() => {
            TableKey::Interact(TableInteraction::CheckboxClicked(row))
        }
        KeyCode::Char('a') => TableKey::Interact(TableInteraction::SelectAllClicked),
        KeyCode::Enter if !engine.data().is_empty() => {
            TableKey::Interact(TableInteraction::RowClicked(row))
        }
        KeyCode::Char('s') if !engine.columns().is_empty() => {
            TableKey::Interact(TableInteraction::HeaderClicked(col))
        }
        KeyCode::Char('[') | KeyCode::PageUp => TableKey::Interact(TableInteraction::PreviousPage),
        KeyCode::Char(']') | KeyCode::PageDown => TableKey::Interact(TableInteraction::NextPage),
        _ => TableKey::Unhandled,
    }
}
