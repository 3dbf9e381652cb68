use dioxus::prelude::*;

use crate::core::{
    CellDisplay, CellValue, ColumnSchema, Columns, DataType, Output, Row, SortValue,
};

#[derive(Debug, Clone, PartialEq)]
pub struct TableHeader {
    pub key: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub key: String,
    pub data_type: DataType,
    pub sort: SortValue,
    pub display: CellDisplay,
}

/// Header plus body grid for the table-visible columns, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct TableModel {
    pub slug: String,
    pub headers: Vec<TableHeader>,
    pub rows: Vec<Vec<TableCell>>,
}

impl TableModel {
    /// `None` when either the dataset or the schema is empty. `project` maps
    /// one raw cell to its sort and display values.
    pub fn build<F>(slug: &str, data: &[Row], columns: &Columns, project: F) -> Option<Self>
    where
        F: Fn(&CellValue, &ColumnSchema, &Row) -> (SortValue, CellDisplay),
    {
        if data.is_empty() || columns.is_empty() {
            return None;
        }

        let visible: Vec<&ColumnSchema> = columns.visible(Output::Table).collect();
        let headers = visible
            .iter()
            .map(|column| TableHeader {
                key: column.key.clone(),
                title: column.title.clone(),
            })
            .collect();

        let rows = data
            .iter()
            .map(|row| {
                visible
                    .iter()
                    .map(|column| {
                        let (sort, display) = project(row.get(&column.key), column, row);
                        TableCell {
                            key: column.key.clone(),
                            data_type: column.data_type,
                            sort,
                            display,
                        }
                    })
                    .collect()
            })
            .collect();

        Some(Self {
            slug: slug.to_string(),
            headers,
            rows,
        })
    }
}

#[component]
pub fn ReportTable(model: TableModel) -> Element {
    let class = format!(
        "badgeos-report-table badgeos-report-{}-table",
        model.slug
    );

    rsx! {
        table { class: "{class}",
            thead {
                tr {
                    for header in model.headers.iter() {
                        th { class: "{header.key}", "{header.title}" }
                    }
                }
            }
            tbody {
                for row in model.rows.iter() {
                    tr {
                        for cell in row.iter() {
                            td { class: "{cell.key}",
                                span {
                                    "data-type": cell.data_type.as_str(),
                                    "data-value": "{cell.sort}",
                                    {cell_content(&cell.display)}
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn cell_content(display: &CellDisplay) -> Element {
    match display {
        CellDisplay::Text(text) => rsx! { "{text}" },
        CellDisplay::Link { href, label } => rsx! {
            a { href: "{href}", "{label}" }
        },
    }
}
