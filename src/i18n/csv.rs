//! Tabular text parser for the localization table.
//!
//! The format is a deliberately small CSV dialect:
//!
//! - Lines are split on any run of `\r` / `\n`; empty lines are dropped.
//!   Quoted cells therefore cannot span lines.
//! - The first line is the header row.
//! - `,` separates cells unless inside a `"` span. Every `"` toggles the span
//!   and is itself dropped; there is no escaped-quote syntax. An unterminated
//!   span runs to the end of the line.
//! - Each cell is trimmed.
//! - A short row is padded with empty cells; cells past the header count are
//!   dropped.

use std::sync::Arc;

/// One data row, addressable by header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    headers: Arc<[String]>,
    values: Vec<String>,
}

impl Record {
    /// Cell value for `header`, or `None` if the table has no such column.
    ///
    /// When a header name is repeated, the rightmost column wins.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.headers
            .iter()
            .rposition(|h| h == header)
            .map(|idx| self.values[idx].as_str())
    }

    /// Cell value by column position.
    pub fn get_index(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).map(String::as_str)
    }

    pub fn contains(&self, header: &str) -> bool {
        self.headers.iter().any(|h| h == header)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// `(header, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }
}

/// A parsed table: header row plus data rows in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    headers: Vec<String>,
    records: Vec<Record>,
}

impl CsvTable {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a CsvTable {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Parse delimited text into a header row and data records.
///
/// Never fails: malformed input degrades to fewer or emptier cells.
pub fn parse(text: &str) -> CsvTable {
    let mut lines = text
        .split(|c: char| c == '\r' || c == '\n')
        .filter(|line| !line.is_empty());

    let Some(header_line) = lines.next() else {
        return CsvTable::default();
    };

    let headers: Vec<String> = split_line(header_line);
    let shared: Arc<[String]> = headers.clone().into();

    let records = lines
        .map(|line| {
            let mut values = split_line(line);
            values.resize(shared.len(), String::new());
            Record {
                headers: Arc::clone(&shared),
                values,
            }
        })
        .collect();

    CsvTable { headers, records }
}

/// Split one physical line into trimmed cells.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== split_line Tests ====================

    #[test]
    fn test_split_line_plain() {
        assert_eq!(split_line("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_line_quoted_comma() {
        assert_eq!(split_line(r#"a,"b,c",d"#), vec!["a", "b,c", "d"]);
    }

    #[test]
    fn test_split_line_trims_cells() {
        assert_eq!(split_line("  a , b ,c  "), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_line_trailing_comma_yields_empty_cell() {
        assert_eq!(split_line("a,b,"), vec!["a", "b", ""]);
    }

    #[test]
    fn test_split_line_unterminated_quote_runs_to_end() {
        assert_eq!(split_line(r#"a,"b,c,d"#), vec!["a", "b,c,d"]);
    }

    #[test]
    fn test_split_line_quotes_are_dropped_mid_cell() {
        assert_eq!(split_line(r#"say "hi",x"#), vec!["say hi", "x"]);
    }

    #[test]
    fn test_split_line_empty() {
        assert_eq!(split_line(""), vec![""]);
    }

    // ==================== parse Tests ====================

    #[test]
    fn test_parse_empty_input() {
        let table = parse("");
        assert!(table.headers().is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn test_parse_header_only() {
        let table = parse("Key,zh-CN,en-US\n");
        assert_eq!(table.headers(), ["Key", "zh-CN", "en-US"]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_parse_mixed_line_endings_and_blank_lines() {
        let table = parse("K1,K2\r\n\r\na,b\r\rc,d\n\n");
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[0].get("K1"), Some("a"));
        assert_eq!(table.records()[1].get("K2"), Some("d"));
    }

    #[test]
    fn test_parse_short_row_padded() {
        let table = parse("K1,K2,K3\nv1,v2");
        let row = &table.records()[0];
        assert_eq!(row.get("K1"), Some("v1"));
        assert_eq!(row.get("K2"), Some("v2"));
        assert_eq!(row.get("K3"), Some(""));
    }

    #[test]
    fn test_parse_long_row_truncated() {
        let table = parse("K1,K2\nv1,v2,v3,v4");
        let row = &table.records()[0];
        assert_eq!(row.iter().count(), 2);
        assert_eq!(row.get_index(2), None);
    }

    #[test]
    fn test_parse_quoted_cell_in_row() {
        let table = parse("Key,en-US\nGreeting,\"Hello, world\"");
        assert_eq!(table.records()[0].get("en-US"), Some("Hello, world"));
    }

    #[test]
    fn test_parse_unknown_header() {
        let table = parse("Key\nx");
        assert_eq!(table.records()[0].get("missing"), None);
        assert!(!table.records()[0].contains("missing"));
    }

    #[test]
    fn test_parse_duplicate_header_rightmost_wins() {
        let table = parse("Key,en-US,en-US\nA,first,second");
        assert_eq!(table.records()[0].get("en-US"), Some("second"));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let text = "Key,zh-CN,en-US\nLoginSuccess,登录成功,Login OK\nQuoted,\"a,b\",c";
        assert_eq!(parse(text), parse(text));
    }

    #[test]
    fn test_record_iter_in_header_order() {
        let table = parse("Key,zh-CN,en-US\nA,甲,a");
        let pairs: Vec<_> = table.records()[0].iter().collect();
        assert_eq!(pairs, vec![("Key", "A"), ("zh-CN", "甲"), ("en-US", "a")]);
    }
}
