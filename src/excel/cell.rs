use calamine::Data;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellType {
    Text,
    Number,
    Date,
    Boolean,
    Empty,
}

/// A single cell value as held by a [`Sheet`](crate::excel::Sheet).
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    String(String),
    Float(f64),
    Int(i64),
    Bool(bool),
    /// Excel serial date number
    DateTime(f64),
    /// Excel error literal such as `#DIV/0!`
    Error(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::String(value.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, CellValue::String(s) if s.starts_with('='))
    }

    pub fn cell_type(&self) -> CellType {
        match self {
            CellValue::Empty => CellType::Empty,
            CellValue::String(s) if s.is_empty() => CellType::Empty,
            CellValue::String(_) | CellValue::Error(_) => CellType::Text,
            CellValue::Float(_) | CellValue::Int(_) => CellType::Number,
            CellValue::Bool(_) => CellType::Boolean,
            CellValue::DateTime(_) => CellType::Date,
        }
    }

    /// Infer a typed value from raw text, the way a user would type it into a cell.
    pub fn infer(input: &str) -> Self {
        if input.is_empty() {
            return CellValue::Empty;
        }
        if input.starts_with('=') {
            return CellValue::String(input.to_string());
        }
        if let Ok(i) = input.parse::<i64>() {
            return CellValue::Int(i);
        }
        if let Ok(f) = input.parse::<f64>() {
            return CellValue::Float(f);
        }
        match input.to_lowercase().as_str() {
            "true" => CellValue::Bool(true),
            "false" => CellValue::Bool(false),
            _ => CellValue::String(input.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::String(s) => f.write_str(s),
            CellValue::Float(v) => {
                if *v == (*v as i64) as f64 && v.abs() < 1e10 {
                    write!(f, "{}", *v as i64)
                } else {
                    write!(f, "{}", v)
                }
            }
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            CellValue::DateTime(dt) => write!(f, "{}", dt),
            CellValue::Error(e) => f.write_str(e),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::String(s.clone()),
            Data::Float(f) => CellValue::Float(*f),
            Data::Int(i) => CellValue::Int(*i),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::Error(e) => CellValue::Error(e.to_string()),
            Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
            Data::DateTimeIso(s) => CellValue::String(s.clone()),
            Data::DurationIso(s) => CellValue::String(s.clone()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Int(value.into())
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}
