use chrono::{DateTime, Utc};

/// Declared semantic type of a host column, as reported by the host's
/// query layer. Classification never inspects cell contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Date,
    Numeric,
    Text,
}

/// One cell delivered by the host query.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Date(DateTime<Utc>),
    Text(String),
    Null,
}

impl CellValue {
    /// Display form used for stage labels and tooltips.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Number(value) => format_trimmed(*value),
            Self::Date(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
            Self::Text(text) => text.clone(),
            Self::Null => String::new(),
        }
    }
}

/// Formats a number without trailing fractional zeros.
#[must_use]
pub fn format_trimmed(value: f64) -> String {
    let rendered = format!("{value:.6}");
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_owned()
}

/// One column of the host data view.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub cells: Vec<CellValue>,
}

impl Column {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ColumnKind, cells: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            kind,
            cells,
        }
    }
}

/// The tabular snapshot the host hands over on each update: one category
/// column plus one or two value columns (measure, optional stage label).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataView {
    pub category: Option<Column>,
    pub values: Vec<Column>,
}

impl DataView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_category(mut self, column: Column) -> Self {
        self.category = Some(column);
        self
    }

    #[must_use]
    pub fn with_value(mut self, column: Column) -> Self {
        self.values.push(column);
        self
    }
}
