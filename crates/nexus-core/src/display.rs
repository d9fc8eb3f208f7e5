//! Terminal rendering of result tables

use arrow::array::{ArrayRef, RecordBatch};
use arrow::error::ArrowError;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use comfy_table::{Attribute, Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

/// Format a count with thousands separators (1234567 → "1,234,567").
pub fn fmt_num(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Render the first `max_rows` rows of a batch as a comfy-table.
pub fn render_batch(batch: &RecordBatch, max_rows: usize) -> Result<String, ArrowError> {
    render_batch_styled(batch, max_rows, |_, _, _| None)
}

/// Like [`render_batch`], with a per-cell background color hook.
///
/// `style` receives the column name, the column and the row index.
pub fn render_batch_styled(
    batch: &RecordBatch,
    max_rows: usize,
    style: impl Fn(&str, &ArrayRef, usize) -> Option<Color>,
) -> Result<String, ArrowError> {
    let schema = batch.schema();
    let options = FormatOptions::default().with_null("null");
    let formatters = batch
        .columns()
        .iter()
        .map(|col| ArrayFormatter::try_new(col.as_ref(), &options))
        .collect::<Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(
            schema
                .fields()
                .iter()
                .map(|f| Cell::new(f.name()).fg(Color::Cyan).add_attribute(Attribute::Bold)),
        );

    let shown = batch.num_rows().min(max_rows);
    for row in 0..shown {
        let cells = formatters.iter().enumerate().map(|(i, fmt)| {
            let cell = Cell::new(fmt.value(row).to_string());
            match style(schema.field(i).name(), batch.column(i), row) {
                Some(bg) => cell.bg(bg).fg(Color::Black).add_attribute(Attribute::Bold),
                None => cell,
            }
        });
        table.add_row(cells);
    }

    let mut out = format!("\n{table}");
    if batch.num_rows() > shown {
        out.push_str(&format!(
            "\n… {} more rows ({} total)",
            fmt_num(batch.num_rows() - shown),
            fmt_num(batch.num_rows())
        ));
    }
    Ok(out)
}
