//! Terminal UI utilities.
//!
//! A small auto-sizing table with Unicode box-drawing characters, used
//! by `ard boards` and `ard libs`. Cell content may carry ANSI color
//! codes; widths are computed from the visible text.

use colored::*;
use std::cmp;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    pub fn print(&self) {
        if self.headers.is_empty() {
            return;
        }

        let term = console::Term::stdout();
        let (_height, term_width) = term.size();

        let mut widths: Vec<usize> = self
            .headers
            .iter()
            .map(|h| h.chars().count())
            .collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = cmp::max(widths[i], visible_width(cell));
            }
        }

        // Shrink the widest columns until the table fits the terminal.
        let overhead = 3 + 3 * self.headers.len();
        let budget = (term_width as usize).saturating_sub(overhead);
        while widths.iter().sum::<usize>() > budget {
            let (idx, &max) = widths
                .iter()
                .enumerate()
                .max_by_key(|(_, w)| **w)
                .unwrap();
            if max <= 8 {
                break;
            }
            widths[idx] = max - 1;
        }

        let sep = |left: &str, mid: &str, right: &str| {
            let mut line = String::from("  ");
            line.push_str(left);
            for (i, w) in widths.iter().enumerate() {
                line.push_str(&"─".repeat(w + 2));
                line.push_str(if i + 1 < widths.len() { mid } else { right });
            }
            line
        };

        println!("{}", sep("┌", "┬", "┐"));
        self.print_row(
            &self
                .headers
                .iter()
                .map(|h| h.bold().to_string())
                .collect::<Vec<_>>(),
            &widths,
        );
        println!("{}", sep("├", "┼", "┤"));
        for row in &self.rows {
            self.print_row(row, &widths);
        }
        println!("{}", sep("└", "┴", "┘"));
    }

    fn print_row(&self, cells: &[String], widths: &[usize]) {
        print!("  │");
        for (i, cell) in cells.iter().enumerate() {
            let clean: String = cell
                .chars()
                .map(|c| if c == '\n' || c == '\r' || c == '\t' { ' ' } else { c })
                .collect();
            let shown = console::truncate_str(&clean, widths[i], "...").to_string();
            let pad = widths[i].saturating_sub(visible_width(&shown));
            print!(" {} {}│", shown, " ".repeat(pad));
        }
        println!();
    }
}

/// Character count with ANSI escape sequences stripped.
fn visible_width(s: &str) -> usize {
    console::measure_text_width(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_with_wrong_arity_is_dropped() {
        let mut table = Table::new(&["A", "B"]);
        table.add_row(vec!["only-one".to_string()]);
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_visible_width_ignores_ansi() {
        let colored_cell = "uno".cyan().bold().to_string();
        assert_eq!(visible_width(&colored_cell), 3);
    }
}
