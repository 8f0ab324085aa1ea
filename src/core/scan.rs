//! Call-site scanning of buffer text.

use std::ops::Range;

use regex::Regex;

/// One recognized translation call in a scanned snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite<'t> {
    /// The configured function name that matched.
    pub function: &'t str,
    /// The key literal, quotes excluded.
    pub key: &'t str,
    /// Byte range of the key text within the snapshot.
    pub key_range: Range<usize>,
}

/// Finds invocations of the configured translation functions.
///
/// A call site is a configured name immediately followed by `(` and exactly
/// one single- or double-quoted string literal. Names only match on
/// identifier boundaries: `greeting_t("x")` is not a `t` call, and neither
/// is `ts("x")`.
pub struct CallSiteScanner {
    pattern: Option<Regex>,
}

impl CallSiteScanner {
    pub fn new(names: &[String]) -> Result<Self, regex::Error> {
        let escaped: Vec<String> = names
            .iter()
            .filter(|name| !name.is_empty())
            .map(|name| regex::escape(name))
            .collect();
        if escaped.is_empty() {
            return Ok(Self { pattern: None });
        }
        let pattern = format!(
            r#"({})\(\s*(?:'([^'\\]*)'|"([^"\\]*)")\s*\)"#,
            escaped.join("|")
        );
        Ok(Self {
            pattern: Some(Regex::new(&pattern)?),
        })
    }

    /// Lazily yield every call site, left to right, in a single pass.
    ///
    /// Matches never overlap; scanning resumes after each match's end.
    pub fn scan<'s, 't>(&'s self, text: &'t str) -> CallSites<'s, 't> {
        CallSites {
            text,
            inner: self.pattern.as_ref().map(|p| p.captures_iter(text)),
        }
    }
}

pub struct CallSites<'s, 't> {
    text: &'t str,
    inner: Option<regex::CaptureMatches<'s, 't>>,
}

impl<'s, 't> Iterator for CallSites<'s, 't> {
    type Item = CallSite<'t>;

    fn next(&mut self) -> Option<CallSite<'t>> {
        let inner = self.inner.as_mut()?;
        for captures in inner.by_ref() {
            let Some(function) = captures.get(1) else {
                continue;
            };
            if has_identifier_prefix(self.text, function.start()) {
                continue;
            }
            let Some(key) = captures.get(2).or_else(|| captures.get(3)) else {
                continue;
            };
            return Some(CallSite {
                function: function.as_str(),
                key: key.as_str(),
                key_range: key.range(),
            });
        }
        None
    }
}

fn has_identifier_prefix(text: &str, start: usize) -> bool {
    text[..start].chars().next_back().is_some_and(is_identifier_char)
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}
