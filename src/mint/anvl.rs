//! ANVL: the line-oriented `key: value` format spoken by the minting service.
//!
//! One attribute per line, in insertion order. Values are percent-encoded for
//! `%`, line feed and carriage return so a multi-line title can never split
//! into a second (bogus) attribute.

/// An ordered list of ANVL attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnvlRecord {
    entries: Vec<(String, String)>,
}

impl AnvlRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: &str) {
        self.entries.push((key.to_string(), value.to_string()));
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Serialize as newline-joined `key: value` lines (no trailing newline).
    pub fn to_body(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{k}: {}", encode(v)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Parse a body produced by [`to_body`](Self::to_body). Lines without a
    /// `:` separator are ignored.
    pub fn parse(body: &str) -> Self {
        let entries = body
            .lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), decode(v.trim())))
            .collect();
        Self { entries }
    }
}

pub fn encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => out.push_str("%25"),
            '\n' => out.push_str("%0A"),
            '\r' => out.push_str("%0D"),
            _ => out.push(c),
        }
    }
    out
}

pub fn decode(value: &str) -> String {
    value
        .replace("%0A", "\n")
        .replace("%0D", "\r")
        .replace("%25", "%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_keeps_insertion_order() {
        let mut record = AnvlRecord::new();
        record.push("_target", "https://example.org/a");
        record.push("_profile", "erc");
        record.push("erc.what", "Album");
        assert_eq!(
            record.to_body(),
            "_target: https://example.org/a\n_profile: erc\nerc.what: Album"
        );
    }

    #[test]
    fn newlines_and_percent_are_encoded() {
        let mut record = AnvlRecord::new();
        record.push("erc.what", "Line one\nLine two 100%");
        assert_eq!(record.to_body(), "erc.what: Line one%0ALine two 100%25");
    }

    #[test]
    fn plain_values_pass_through() {
        assert_eq!(encode("Farms; Agriculture"), "Farms; Agriculture");
    }

    #[test]
    fn parse_reads_lines_back() {
        let mut record = AnvlRecord::new();
        record.push("_target", "https://example.org/a");
        record.push("erc.what", "Title\r\nwith 5% break");
        let parsed = AnvlRecord::parse(&record.to_body());
        assert_eq!(parsed, record);
        assert_eq!(parsed.keys(), vec!["_target", "erc.what"]);
    }
}
