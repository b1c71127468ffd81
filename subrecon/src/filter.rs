use std::{
    borrow::Cow,
    collections::BTreeSet,
    fmt, io,
    path::Path,
    str::FromStr,
};

use regex::Regex;
use tokio::fs;

use crate::{runner, Error};

/// 7-bit escape sequences, CSI (`ESC [ ... m`) included.
const ANSI_ESCAPE: &str = r"\x1B[@-_][0-?]*[ -/]*[@-~]";

/// An HTTP status code as written by the prober, e.g. `200`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusCode(String);

impl StatusCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        StatusCode(String::from("200"))
    }
}

impl FromStr for StatusCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidStatusCode(s.to_string()));
        }
        Ok(StatusCode(code.to_string()))
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keeps probe records carrying one of the accepted status codes.
///
/// Matching is a literal search for `[code]` in the escape-stripped line, not
/// a parse of the record's fields: `[200]` in a title or length field matches
/// as well. `[12345]` never matches `1234` since both brackets are part of
/// the pattern.
#[derive(Debug)]
pub struct StatusFilter {
    codes: BTreeSet<StatusCode>,
    patterns: Vec<String>,
    ansi: Regex,
}

impl StatusFilter {
    pub fn new<I>(codes: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = StatusCode>,
    {
        let codes: BTreeSet<StatusCode> = codes.into_iter().collect();
        let patterns = codes.iter().map(|code| format!("[{}]", code)).collect();

        Ok(StatusFilter {
            codes,
            patterns,
            ansi: Regex::new(ANSI_ESCAPE)?,
        })
    }

    /// Comma separated codes, sorted, e.g. `200,301`.
    pub fn label(&self) -> String {
        self.codes
            .iter()
            .map(StatusCode::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn strip_ansi<'a>(&self, line: &'a str) -> Cow<'a, str> {
        self.ansi.replace_all(line, "")
    }

    /// URL of `record` if it carries an accepted code. The URL is the first
    /// whitespace separated token that is not a bracketed metadata token.
    pub fn accept(&self, record: &str) -> Option<String> {
        let clean = self.strip_ansi(record);
        let clean = clean.trim();
        if clean.is_empty() {
            return None;
        }

        if !self.patterns.iter().any(|pattern| clean.contains(pattern.as_str())) {
            return None;
        }

        clean
            .split_whitespace()
            .find(|token| !token.starts_with('['))
            .map(str::to_string)
    }

    /// Accepted URLs in input order.
    pub fn filter_lines<'a, I>(&self, records: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        records
            .into_iter()
            .filter_map(|record| self.accept(record))
            .collect()
    }

    /// Filter the records of `input` into `output`, one URL per line.
    /// Returns the number of URLs kept.
    pub async fn filter_file(&self, input: &Path, output: &Path) -> Result<usize, Error> {
        let raw = match fs::read(input).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(Error::FilterInputMissing(input.to_path_buf()))
            }
            Err(err) => return Err(err.into()),
        };

        let records: Vec<String> = raw
            .split(|byte| *byte == b'\n')
            .map(runner::decode_line)
            .collect();
        let urls = self.filter_lines(records.iter().map(String::as_str));

        let mut contents = String::new();
        for url in &urls {
            contents.push_str(url);
            contents.push('\n');
        }
        fs::write(output, contents).await?;

        Ok(urls.len())
    }
}
