use comfy_table::{presets::NOTHING, *};

use covidtrends::explore::Exploration;

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_style(comfy_table::TableComponent::BottomBorder, '─')
        .set_style(comfy_table::TableComponent::MiddleHeaderIntersections, '─')
        .set_style(comfy_table::TableComponent::HeaderLines, '─')
        .set_style(comfy_table::TableComponent::BottomBorderIntersections, '─')
        .set_style(comfy_table::TableComponent::TopBorder, '─')
        .set_style(comfy_table::TableComponent::TopBorderIntersections, '─');
    table
}

pub fn display_exploration(exploration: &Exploration) {
    println!("Columns in the dataset:");
    println!("{}", exploration.column_names().join(", "));

    let mut preview = base_table();
    preview.set_header(
        exploration
            .column_names()
            .iter()
            .map(|name| Cell::new(name).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    for row in &exploration.preview {
        preview.add_row(row.clone());
    }
    println!("\nPreview of the data:\n{preview}");

    let mut summary = base_table();
    summary.set_header(vec![
        Cell::new("Column").add_attribute(Attribute::Bold),
        Cell::new("Type").add_attribute(Attribute::Bold),
        Cell::new("Missing values").add_attribute(Attribute::Bold),
    ]);
    for column in &exploration.columns {
        summary.add_row(vec![
            column.name.clone(),
            column.dtype.clone(),
            column.null_count.to_string(),
        ]);
    }
    println!("\nColumn types and missing values:\n{summary}");

    println!(
        "\n{} rows, estimated size {:.1} KiB",
        exploration.rows,
        exploration.estimated_size_bytes as f64 / 1024.0
    );
}
