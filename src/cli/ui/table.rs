use crate::cli::ui::style::UiStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Declarative description of a table column.
#[derive(Debug, Clone)]
pub struct TableColumn {
    pub header: String,
    pub min_width: usize,
    pub align: Align,
}

impl TableColumn {
    pub fn new(header: impl Into<String>) -> Self {
        let header = header.into();
        Self {
            min_width: header.chars().count(),
            header,
            align: Align::Left,
        }
    }

    /// Right-aligned column, used for amounts and counts.
    pub fn numeric(header: impl Into<String>) -> Self {
        Self {
            align: Align::Right,
            ..Self::new(header)
        }
    }
}

/// Simple table model used for read-only overviews.
#[derive(Debug, Clone)]
pub struct Table {
    pub title: Option<String>,
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(title: Option<&str>, columns: Vec<TableColumn>) -> Self {
        Self {
            title: title.map(str::to_string),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row<S: Into<String>>(&mut self, cells: Vec<S>) {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
                    .max(column.min_width)
            })
            .collect()
    }

    /// Renders padded columns; trailing whitespace is trimmed from each line.
    pub fn render(&self, style: &UiStyle) -> String {
        let widths = self.widths();
        let total_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        let mut out = String::new();

        if let Some(title) = &self.title {
            out.push_str(&style.header(title));
            out.push('\n');
        }
        let header: Vec<String> = self.columns.iter().map(|c| c.header.clone()).collect();
        out.push_str(&style.header(&self.line(&header, &widths)));
        out.push('\n');
        out.push_str(&style.horizontal_line(total_width));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&self.line(row, &widths));
            out.push('\n');
        }
        out
    }

    pub fn print(&self, style: &UiStyle) {
        print!("{}", self.render(style));
    }

    fn line(&self, cells: &[String], widths: &[usize]) -> String {
        let parts: Vec<String> = self
            .columns
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(idx, (column, width))| {
                let cell = cells.get(idx).map(String::as_str).unwrap_or("");
                match column.align {
                    Align::Left => format!("{cell:<width$}"),
                    Align::Right => format!("{cell:>width$}"),
                }
            })
            .collect();
        parts.join("  ").trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_grow_to_fit_cells() {
        let mut table = Table::new(None, vec![TableColumn::new("Id"), TableColumn::numeric("Amount")]);
        table.add_row(vec!["INV-0001", "1250.00"]);
        table.add_row(vec!["INV-0002", "5.00"]);

        let rendered = table.render(&UiStyle::plain());
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines[0], "Id         Amount");
        assert_eq!(lines[1], "-".repeat(17));
        assert_eq!(lines[2], "INV-0001  1250.00");
        assert_eq!(lines[3], "INV-0002     5.00");
    }
}
