//! Column schema: how each dataset field is typed and where it may appear.

use serde::{Deserialize, Serialize};

/// Formatting tag for a column. Controls presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Integer,
    Float,
    Percentage,
    String,
    Date,
    PostTitle,
    UserLogin,
    Earnings,
    Email,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::Percentage => "percentage",
            DataType::String => "string",
            DataType::Date => "date",
            DataType::PostTitle => "post_title",
            DataType::UserLogin => "user_login",
            DataType::Earnings => "earnings",
            DataType::Email => "email",
        }
    }
}

/// The three outputs a column can be shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Table,
    Chart,
    Csv,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub key: String,
    pub title: String,
    pub data_type: DataType,
    pub show_in_table: bool,
    pub show_in_chart: bool,
    pub show_in_csv: bool,
}

impl ColumnSchema {
    /// A column visible in every output.
    pub fn new(key: impl Into<String>, title: impl Into<String>, data_type: DataType) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            data_type,
            show_in_table: true,
            show_in_chart: true,
            show_in_csv: true,
        }
    }

    /// A column hidden from every output (typically the entity id).
    pub fn hidden(key: impl Into<String>, title: impl Into<String>, data_type: DataType) -> Self {
        Self::new(key, title, data_type).visible_in(&[])
    }

    /// Replace the visibility flags with exactly `outputs`.
    pub fn visible_in(mut self, outputs: &[Output]) -> Self {
        self.show_in_table = outputs.contains(&Output::Table);
        self.show_in_chart = outputs.contains(&Output::Chart);
        self.show_in_csv = outputs.contains(&Output::Csv);
        self
    }

    pub fn shows_in(&self, output: Output) -> bool {
        match output {
            Output::Table => self.show_in_table,
            Output::Chart => self.show_in_chart,
            Output::Csv => self.show_in_csv,
        }
    }
}

/// Ordered, keyed column schema. Insertion order is display order and keys
/// are unique: pushing an existing key replaces it in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Columns(Vec<ColumnSchema>);

impl Columns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: ColumnSchema) -> Self {
        self.push(column);
        self
    }

    pub fn push(&mut self, column: ColumnSchema) {
        match self.0.iter_mut().find(|existing| existing.key == column.key) {
            Some(existing) => *existing = column,
            None => self.0.push(column),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ColumnSchema> {
        self.0.iter().find(|column| column.key == key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnSchema> {
        self.0.iter()
    }

    /// Columns shown in `output`, in schema order.
    pub fn visible(&self, output: Output) -> impl Iterator<Item = &ColumnSchema> + '_ {
        self.0.iter().filter(move |column| column.shows_in(output))
    }

    /// A copy without the columns hidden from `output`.
    pub fn restricted_to(&self, output: Output) -> Columns {
        Columns(self.visible(output).cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ColumnSchema> for Columns {
    fn from_iter<I: IntoIterator<Item = ColumnSchema>>(iter: I) -> Self {
        let mut columns = Columns::new();
        for column in iter {
            columns.push(column);
        }
        columns
    }
}

impl<'a> IntoIterator for &'a Columns {
    type Item = &'a ColumnSchema;
    type IntoIter = std::slice::Iter<'a, ColumnSchema>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
