//! Plain-text rendering: menus, tables and the task list.
//!
//! Column width is the number of characters, not display cells, so wide
//! glyphs will push a row out of line.

use crate::core::store::TaskPage;
use crate::core::task::{ListTaskFilter, Task};
use crate::core::time::{format_optional, format_time};

pub const TASK_COLUMNS: [&str; 7] = [
    "Id",
    "Name",
    "Status",
    "Create Time",
    "Actual Start",
    "Expected End",
    "Actual End",
];

fn width(s: &str) -> usize {
    s.chars().count()
}

/// Widest cell per column, header included.
pub fn column_widths(columns: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    columns
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| width(cell))
                .fold(width(header), usize::max)
        })
        .collect()
}

/// Renders a `|`-bordered table with a dashed line above and below the
/// header and after the last row.
pub fn render_table(columns: &[&str], rows: &[Vec<String>]) -> String {
    let widths = column_widths(columns, rows);

    let separator = format!(
        "|-{}-|",
        widths
            .iter()
            .map(|w| "-".repeat(w + 1))
            .collect::<Vec<_>>()
            .join("-|-")
    );

    let mut out = Vec::with_capacity(rows.len() + 4);
    out.push(separator.clone());
    out.push(bordered_line(columns.iter().copied(), &widths));
    out.push(separator.clone());
    for row in rows {
        let cells = (0..columns.len()).map(|i| row.get(i).map_or("", String::as_str));
        out.push(bordered_line(cells, &widths));
    }
    out.push(separator);

    let mut table = out.join("\n");
    table.push('\n');
    table
}

fn bordered_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded = cells
        .zip(widths)
        .map(|(cell, w)| format!("{cell}{}", " ".repeat(w + 1 - width(cell))))
        .collect::<Vec<_>>()
        .join(" | ");
    format!("| {padded} |")
}

/// Title, a blank line, one ` N. option` line per option, a blank line.
pub fn render_menu(title: &str, options: &[&str]) -> String {
    let mut menu = format!("{title}\n\n");
    for (i, option) in options.iter().enumerate() {
        menu.push_str(&format!(" {i}. {option}\n"));
    }
    menu.push('\n');
    menu
}

pub fn task_row(task: &Task) -> Vec<String> {
    vec![
        task.id.to_string(),
        task.name.clone(),
        task.status.label().to_string(),
        format_time(&task.ctime),
        format_optional(task.actual_start.as_ref()),
        format_optional(task.expected_end.as_ref()),
        format_optional(task.actual_end.as_ref()),
    ]
}

/// The task table followed by totals, page number and active filters.
pub fn render_task_page(page_number: u32, page: &TaskPage, filter: &ListTaskFilter) -> String {
    let rows: Vec<Vec<String>> = page.tasks.iter().map(task_row).collect();
    let mut out = render_table(&TASK_COLUMNS, &rows);

    out.push_str(&format!("\nTotal: {}\n", page.total));
    out.push_str(&format!("Page:  {page_number}\n"));
    for line in filter.describe() {
        out.push_str(&format!("Filtered: {line}\n"));
    }
    out.push('\n');
    out
}
