//! Identifier delimiting and parameter placeholders.

use serde::Deserialize;

/// How parameter placeholders are written into statement text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamStyle {
    /// `?Param0`, `?Param1`, ... (prefix configurable)
    #[default]
    Named,
    /// `?` for every parameter
    Question,
    /// `$1`, `$2`, ... (PostgreSQL)
    Dollar,
}

/// Writes identifiers and placeholders for generated statements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFormatter {
    left_delimiter: String,
    right_delimiter: String,
    param_style: ParamStyle,
    param_prefix: String,
}

impl Default for SqlFormatter {
    fn default() -> Self {
        Self {
            left_delimiter: String::new(),
            right_delimiter: String::new(),
            param_style: ParamStyle::Named,
            param_prefix: "?Param".to_string(),
        }
    }
}

impl SqlFormatter {
    pub fn new(
        left_delimiter: impl Into<String>,
        right_delimiter: impl Into<String>,
        param_style: ParamStyle,
        param_prefix: impl Into<String>,
    ) -> Self {
        Self {
            left_delimiter: left_delimiter.into(),
            right_delimiter: right_delimiter.into(),
            param_style,
            param_prefix: param_prefix.into(),
        }
    }

    pub fn param_style(&self) -> ParamStyle {
        self.param_style
    }

    /// Wrap an identifier in the configured delimiters
    pub fn delimit(&self, identifier: &str) -> String {
        format!("{}{identifier}{}", self.left_delimiter, self.right_delimiter)
    }

    /// `table.column`, each part delimited
    pub fn qualified(&self, table: &str, column: &str) -> String {
        format!("{}.{}", self.delimit(table), self.delimit(column))
    }

    /// Placeholder for the zero-based parameter `index`
    pub fn placeholder(&self, index: usize) -> String {
        match self.param_style {
            ParamStyle::Named => format!("{}{index}", self.param_prefix),
            ParamStyle::Question => "?".to_string(),
            ParamStyle::Dollar => format!("${}", index + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_formatter_is_undelimited_named() {
        let formatter = SqlFormatter::default();
        assert_eq!(formatter.qualified("Shape", "ShapeID"), "Shape.ShapeID");
        assert_eq!(formatter.placeholder(0), "?Param0");
        assert_eq!(formatter.placeholder(11), "?Param11");
    }

    #[test]
    fn test_delimited_dollar_formatter() {
        let formatter = SqlFormatter::new("\"", "\"", ParamStyle::Dollar, "");
        assert_eq!(formatter.qualified("Shape", "ShapeID"), "\"Shape\".\"ShapeID\"");
        assert_eq!(formatter.placeholder(0), "$1");
    }

    #[test]
    fn test_question_style() {
        let formatter = SqlFormatter::new("`", "`", ParamStyle::Question, "");
        assert_eq!(formatter.delimit("Circle"), "`Circle`");
        assert_eq!(formatter.placeholder(3), "?");
    }
}
