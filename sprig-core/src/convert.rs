// Request parameter conversion
//
// Raw parameter values are strings. A handler parameter declares a type tag
// and the table maps the tag to a converter. Tags with no converter receive
// the raw string unchanged.

use std::collections::HashMap;

/// Declared type of a handler parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Whole number
    Integer,
    /// Floating point number
    Decimal,
    Text,
    /// Collection of strings; multi-valued parameters are passed as-is
    TextList,
    /// Any other type, identified by name
    Other(&'static str),
}

impl TypeTag {
    pub fn is_collection(&self) -> bool {
        matches!(self, TypeTag::TextList)
    }

    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Integer => "Integer",
            TypeTag::Decimal => "Decimal",
            TypeTag::Text => "Text",
            TypeTag::TextList => "TextList",
            TypeTag::Other(name) => name,
        }
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A converted argument value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Decimal(f64),
    Text(String),
    List(Vec<String>),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::Text(v) => f.write_str(v),
            Value::List(v) => f.write_str(&v.join(",")),
        }
    }
}

/// Converter from a raw string; the error is a human-readable reason
pub type Converter = fn(&str) -> Result<Value, String>;

/// Closed-set dispatch table from type tag to converter
#[derive(Clone)]
pub struct ConversionTable {
    converters: HashMap<TypeTag, Converter>,
}

impl ConversionTable {
    /// A table with no converters; every value passes through as text
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Add or replace the converter for a tag
    pub fn register(&mut self, tag: TypeTag, converter: Converter) -> &mut Self {
        self.converters.insert(tag, converter);
        self
    }

    pub fn supports(&self, tag: TypeTag) -> bool {
        self.converters.contains_key(&tag)
    }

    /// Convert the raw values supplied for one parameter
    ///
    /// Collection targets receive the values untouched. Every other target
    /// receives the values joined with commas.
    pub fn convert(&self, tag: TypeTag, values: &[String]) -> Result<Value, String> {
        if tag.is_collection() {
            return Ok(Value::List(values.to_vec()));
        }

        let raw = values.join(",");
        match self.converters.get(&tag) {
            Some(converter) => converter(&raw),
            None => Ok(Value::Text(raw)),
        }
    }
}

impl Default for ConversionTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table
            .register(TypeTag::Integer, convert_integer)
            .register(TypeTag::Decimal, convert_decimal)
            .register(TypeTag::Text, convert_text);
        table
    }
}

impl std::fmt::Debug for ConversionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<_> = self.converters.keys().map(TypeTag::name).collect();
        tags.sort_unstable();
        f.debug_struct("ConversionTable").field("tags", &tags).finish()
    }
}

fn convert_integer(raw: &str) -> Result<Value, String> {
    raw.parse::<i64>()
        .map(Value::Integer)
        .map_err(|e| e.to_string())
}

fn convert_decimal(raw: &str) -> Result<Value, String> {
    raw.parse::<f64>()
        .map(Value::Decimal)
        .map_err(|e| e.to_string())
}

fn convert_text(raw: &str) -> Result<Value, String> {
    Ok(Value::Text(raw.to_string()))
}
