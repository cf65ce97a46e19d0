use eventcal_shared::MonthGrid;
use eventcal_shared::grid::weekday_labels;
use unicode_width::UnicodeWidthStr;

const CELL_WIDTH: usize = 4;

/// Renders the calendar container with the same element and class
/// layout the web frontend produces.
#[tracing::instrument(skip(grid), fields(year = grid.year, month = grid.month))]
pub fn render_html(grid: &MonthGrid, container_id: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("<div id=\"{}\">\n", escape_html(container_id)));

    for _ in 0..grid.leading_blanks {
        out.push_str("  <div class=\"calendar-day\"></div>\n");
    }

    for cell in &grid.days {
        let class = if cell.is_today {
            "calendar-day today"
        } else {
            "calendar-day"
        };
        out.push_str(&format!("  <div class=\"{class}\">\n"));
        out.push_str(&format!("    <div class=\"date\">{}</div>\n", cell.day()));
        for event in &cell.events {
            out.push_str(&format!(
                "    <div class=\"event\"><strong>{}</strong><br>{}</div>\n",
                escape_html(&event.name),
                escape_html(&event.time_label)
            ));
        }
        out.push_str("  </div>\n");
    }

    out.push_str("</div>\n");
    out
}

/// The container holding only the load failure message.
pub fn render_error_html(container_id: &str, message: &str) -> String {
    format!(
        "<div id=\"{}\">\n  <p>{}</p>\n</div>\n",
        escape_html(container_id),
        escape_html(message)
    )
}

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Month grid with day numbers, then one agenda line per placed
    /// event.
    #[tracing::instrument(skip(self, grid), fields(year = grid.year, month = grid.month))]
    pub fn render_text(&self, grid: &MonthGrid) -> String {
        let mut out = String::new();
        let width = CELL_WIDTH * 7;
        let title = grid.title();
        let pad = width.saturating_sub(UnicodeWidthStr::width(title.as_str())) / 2;
        out.push_str(&" ".repeat(pad));
        out.push_str(&self.paint(&title, "1"));
        out.push('\n');

        for label in weekday_labels(grid.week_start) {
            out.push_str(&format!("{label:>width$}", width = CELL_WIDTH));
        }
        out.push('\n');

        let mut column = 0usize;
        for _ in 0..grid.leading_blanks {
            out.push_str(&" ".repeat(CELL_WIDTH));
            column += 1;
        }

        for cell in &grid.days {
            let number = format!("{:>2}", cell.day());
            let marked = if cell.is_today {
                format!("[{number}]")
            } else if cell.events.is_empty() {
                format!(" {number} ")
            } else {
                format!(" {number}*")
            };
            let marked = if cell.is_today {
                self.paint(&marked, "7")
            } else if !cell.events.is_empty() {
                self.paint(&marked, "33")
            } else {
                marked
            };
            out.push_str(&marked);

            column += 1;
            if column == 7 {
                out.truncate(out.trim_end_matches(' ').len());
                out.push('\n');
                column = 0;
            }
        }
        if column != 0 {
            out.truncate(out.trim_end_matches(' ').len());
            out.push('\n');
        }

        let rows = grid
            .days
            .iter()
            .flat_map(|cell| {
                cell.events.iter().map(move |event| {
                    vec![
                        cell.date.format("%a %d").to_string(),
                        event.name.clone(),
                        event.time_label.clone(),
                    ]
                })
            })
            .collect::<Vec<_>>();

        if !rows.is_empty() {
            out.push('\n');
            write_table(&mut out, rows);
        }

        out
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table(out: &mut String, rows: Vec<Vec<String>>) {
    let column_count = rows.first().map(Vec::len).unwrap_or(0);
    let mut widths = vec![0usize; column_count];

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(cell.as_str()));
        }
    }

    for row in rows {
        let mut line = String::new();
        for (idx, cell) in row.iter().enumerate() {
            let padding = widths[idx].saturating_sub(UnicodeWidthStr::width(cell.as_str()));
            line.push_str(cell);
            line.push_str(&" ".repeat(padding + 2));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
