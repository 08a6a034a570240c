//! Parsing of free-form `Key: value` header text.

use std::collections::BTreeMap;

/// Header name to value. Names keep the case they were written with.
pub type Headers = BTreeMap<String, String>;

/// Parse header text with one `Key: value` pair per line.
///
/// Lines are split on `\n` or `\r\n` and trimmed; blank lines, lines without
/// a colon and lines with an empty key are skipped. Only the first colon
/// separates key from value, so `Host: example.com:8080` keeps its port.
/// A repeated key keeps its last value. `None` and `""` give an empty map.
pub fn parse_headers<'a>(text: impl Into<Option<&'a str>>) -> Headers {
    let mut headers = Headers::new();
    let Some(text) = text.into() else {
        return headers;
    };

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        headers.insert(key.to_string(), value.trim().to_string());
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> Headers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_one_pair_per_line() {
        let headers = parse_headers("Content-Type: application/json\nX-Test: 1");
        assert_eq!(
            headers,
            map(&[("Content-Type", "application/json"), ("X-Test", "1")])
        );
    }

    #[test]
    fn empty_and_missing_input_give_empty_map() {
        assert!(parse_headers("").is_empty());
        assert!(parse_headers(None::<&str>).is_empty());
        assert!(parse_headers(" \n\r\n  ").is_empty());
    }

    #[test]
    fn line_without_colon_is_skipped() {
        let headers = parse_headers("malformed-line\nKey: value");
        assert_eq!(headers, map(&[("Key", "value")]));
    }

    #[test]
    fn last_duplicate_wins() {
        assert_eq!(parse_headers("A: 1\nA: 2"), map(&[("A", "2")]));
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let headers = parse_headers("Accept: */*\r\nX-Id: 7\r\n");
        assert_eq!(headers, map(&[("Accept", "*/*"), ("X-Id", "7")]));
    }

    #[test]
    fn only_first_colon_splits() {
        let headers = parse_headers("Host: example.com:8080");
        assert_eq!(headers, map(&[("Host", "example.com:8080")]));
    }

    #[test]
    fn empty_key_is_skipped_but_empty_value_is_kept() {
        let headers = parse_headers(": orphan\nX-Empty:");
        assert_eq!(headers, map(&[("X-Empty", "")]));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let headers = parse_headers("   Authorization :   Bearer abc   ");
        assert_eq!(headers, map(&[("Authorization", "Bearer abc")]));
    }
}
