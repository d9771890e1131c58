use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// One data line of a resource, keyed by header name.
///
/// Headers are shared between all rows of a table. A value is `None` when
/// the physical line had fewer cells than the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    number: usize,
    headers: Arc<[String]>,
    values: Vec<Option<String>>,
}

impl Row {
    /// Build a row; `values` is padded with `None` up to the header width.
    pub fn new(number: usize, headers: Arc<[String]>, mut values: Vec<Option<String>>) -> Self {
        values.resize(headers.len(), None);
        Self {
            number,
            headers,
            values,
        }
    }

    /// Physical row number (the header line is row 1).
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Raw value of a field; `None` when the field or the cell is absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        let idx = self.position(name)?;
        self.values[idx].as_deref()
    }

    /// Value by header position.
    pub fn value_at(&self, index: usize) -> Option<&str> {
        self.values.get(index)?.as_deref()
    }

    /// Value of a field when present and not blank.
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|value| !value.trim().is_empty())
    }

    pub fn is_present_non_empty(&self, name: &str) -> bool {
        self.non_empty(name).is_some()
    }

    /// Apply `f` to the value of `name` if it is a present string.
    pub fn map_value<F>(&mut self, name: &str, f: F) -> bool
    where
        F: FnOnce(&str) -> String,
    {
        let Some(idx) = self.position(name) else {
            return false;
        };
        if let Some(value) = self.values[idx].as_deref() {
            self.values[idx] = Some(f(value));
        }
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Option::as_deref))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.headers.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Arc<[String]> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn pads_short_rows_and_reports_presence() {
        let row = Row::new(
            2,
            headers(&["QUESTION_CODE", "ANSWER_CODE", "POTENTIAL_NEED_INDICATED"]),
            vec![Some("71802-3".into()), Some("  ".into())],
        );
        assert_eq!(row.number(), 2);
        assert_eq!(row.get("QUESTION_CODE"), Some("71802-3"));
        assert!(row.contains_field("POTENTIAL_NEED_INDICATED"));
        assert_eq!(row.get("POTENTIAL_NEED_INDICATED"), None);
        assert!(!row.is_present_non_empty("ANSWER_CODE"));
        assert!(!row.contains_field("SDOH_DOMAIN"));
    }

    #[test]
    fn serializes_in_header_order() {
        let row = Row::new(
            2,
            headers(&["B", "A"]),
            vec![Some("2".into()), None],
        );
        let json = serde_json::to_string(&row).expect("serialize row");
        assert_eq!(json, r#"{"B":"2","A":null}"#);
    }

    #[test]
    fn map_value_skips_absent_cells() {
        let mut row = Row::new(3, headers(&["GENDER", "STATE"]), vec![Some("Female".into())]);
        assert!(row.map_value("GENDER", str::to_ascii_lowercase));
        assert!(row.map_value("STATE", str::to_ascii_lowercase));
        assert!(!row.map_value("ZIP", str::to_ascii_lowercase));
        assert_eq!(row.get("GENDER"), Some("female"));
        assert_eq!(row.get("STATE"), None);
    }
}
