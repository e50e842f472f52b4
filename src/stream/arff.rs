//! ARFF (Attribute-Relation File Format) reader.
//!
//! Supports `numeric`/`real`/`integer` and nominal attributes, dense and
//! sparse data rows, `?` for missing values, `%` comments and quoted names
//! or values. The header is parsed eagerly when the stream is opened; data
//! rows are parsed one line at a time as they are pulled.

use super::InstanceStream;
use crate::config::ColumnIndex;
use crate::error::{NellyError, Result};
use crate::instance::{Attribute, AttributeKind, Instance, InstanceHeader, MISSING};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// Lazy ARFF record source.
#[derive(Debug)]
pub struct ArffStream<R> {
    lines: Lines<R>,
    line_no: usize,
    header: InstanceHeader,
}

impl ArffStream<BufReader<File>> {
    /// Open an ARFF file with the target at `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or its header is invalid.
    pub fn open(path: impl AsRef<Path>, target: ColumnIndex) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file), target)
    }
}

impl<R: BufRead> ArffStream<R> {
    /// Read the header from `reader`, leaving it positioned on the data section.
    ///
    /// # Errors
    ///
    /// Returns [`NellyError::Parse`] for a malformed header and
    /// [`NellyError::InvalidColumn`] if `target` is not a column.
    pub fn from_reader(reader: R, target: ColumnIndex) -> Result<Self> {
        let mut lines = reader.lines();
        let mut line_no = 0;
        let mut relation = String::new();
        let mut attributes = Vec::new();
        let mut found_data = false;

        while let Some(line) = lines.next() {
            let line = line?;
            line_no += 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('%') {
                continue;
            }

            let (keyword, rest) = split_keyword(line);
            match keyword.to_ascii_lowercase().as_str() {
                "@relation" => {
                    relation = unquote(rest.trim()).to_string();
                }
                "@attribute" => {
                    let attribute =
                        parse_attribute(rest).map_err(|message| NellyError::Parse {
                            line: line_no,
                            message,
                        })?;
                    attributes.push(attribute);
                }
                "@data" => {
                    found_data = true;
                    break;
                }
                _ => {
                    return Err(NellyError::Parse {
                        line: line_no,
                        message: format!("unexpected header line '{line}'"),
                    });
                }
            }
        }

        if !found_data {
            return Err(NellyError::Parse {
                line: line_no,
                message: "missing @data section".to_string(),
            });
        }
        if attributes.is_empty() {
            return Err(NellyError::Parse {
                line: line_no,
                message: "no @attribute declarations".to_string(),
            });
        }

        let class_index = target.resolve(attributes.len(), "target_column")?;
        let header = InstanceHeader::new(relation, attributes, class_index)?;

        Ok(Self {
            lines,
            line_no,
            header,
        })
    }

    fn parse_row(&self, line: &str) -> Result<Instance> {
        let parse_err = |message: String| NellyError::Parse {
            line: self.line_no,
            message,
        };

        let n = self.header.num_attributes();
        let values = if let Some(body) = line.strip_prefix('{') {
            let body = strip_sparse_weight(body)
                .strip_suffix('}')
                .ok_or_else(|| parse_err("unterminated sparse row".to_string()))?;
            let mut values = vec![0.0; n];
            for entry in split_values(body).map_err(parse_err)? {
                let entry = entry.trim();
                if entry.is_empty() {
                    continue;
                }
                let (index, raw) = entry
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| parse_err(format!("sparse entry '{entry}' has no value")))?;
                let index: usize = index
                    .parse()
                    .map_err(|_| parse_err(format!("invalid sparse index '{index}'")))?;
                let attribute = self.header.attribute(index).ok_or_else(|| {
                    parse_err(format!("sparse index {index} out of range (len={n})"))
                })?;
                values[index] = parse_value(attribute, unquote(raw.trim())).map_err(parse_err)?;
            }
            values
        } else {
            let mut tokens = split_values(line).map_err(parse_err)?;
            // trailing instance weight: `..., {w}`
            if tokens.len() == n + 1
                && tokens
                    .last()
                    .is_some_and(|t| t.starts_with('{') && t.ends_with('}'))
            {
                tokens.pop();
            }
            if tokens.len() != n {
                return Err(parse_err(format!(
                    "expected {n} values, found {}",
                    tokens.len()
                )));
            }
            tokens
                .iter()
                .zip(self.header.attributes())
                .map(|(token, attribute)| parse_value(attribute, token))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(parse_err)?
        };

        Instance::with_header(values, &self.header)
    }
}

impl<R: BufRead> InstanceStream for ArffStream<R> {
    fn header(&self) -> &InstanceHeader {
        &self.header
    }

    fn next_instance(&mut self) -> Option<Result<Instance>> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('%') {
                continue;
            }
            return Some(self.parse_row(line));
        }
    }
}

/// Drop a trailing instance weight (`..., 2 3}, {w}`) from a sparse row body.
fn strip_sparse_weight(body: &str) -> &str {
    let Some(open) = body.rfind('{') else {
        return body;
    };
    if !body.ends_with('}') {
        return body;
    }
    match body[..open].trim_end().strip_suffix(',') {
        Some(row) if row.trim_end().ends_with('}') => row.trim_end(),
        _ => body,
    }
}

fn split_keyword(line: &str) -> (&str, &str) {
    match line.find(char::is_whitespace) {
        Some(pos) => (&line[..pos], &line[pos..]),
        None => (line, ""),
    }
}

fn unquote(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2
        && ((bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\'')
            || (bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"'))
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn parse_attribute(rest: &str) -> std::result::Result<Attribute, String> {
    let rest = rest.trim();
    let (name, kind) = match rest.chars().next() {
        Some(quote @ ('\'' | '"')) => {
            let end = rest[1..]
                .find(quote)
                .ok_or_else(|| format!("unterminated attribute name in '{rest}'"))?;
            (&rest[1..=end], rest[end + 2..].trim())
        }
        Some(_) => {
            let (name, kind) = split_keyword(rest);
            (name, kind.trim())
        }
        None => return Err("missing attribute name".to_string()),
    };

    if kind.is_empty() {
        return Err(format!("attribute '{name}' has no type"));
    }

    if let Some(body) = kind.strip_prefix('{') {
        let body = body
            .strip_suffix('}')
            .ok_or_else(|| format!("unterminated nominal declaration for '{name}'"))?;
        let labels = split_values(body)?;
        if labels.is_empty() {
            return Err(format!("nominal attribute '{name}' declares no values"));
        }
        return Ok(Attribute::nominal(name, labels));
    }

    let type_name = split_keyword(kind).0.to_ascii_lowercase();
    match type_name.as_str() {
        "numeric" | "real" | "integer" => Ok(Attribute::numeric(name)),
        "string" | "date" | "relational" => Err(format!(
            "attribute '{name}' has unsupported type '{type_name}'"
        )),
        other => Err(format!("attribute '{name}' has unknown type '{other}'")),
    }
}

fn parse_value(attribute: &Attribute, token: &str) -> std::result::Result<f64, String> {
    if token == "?" {
        return Ok(MISSING);
    }
    match attribute.kind() {
        AttributeKind::Numeric => token
            .parse::<f64>()
            .map_err(|_| format!("'{token}' is not a number ({})", attribute.name())),
        AttributeKind::Nominal(_) => attribute
            .index_of_value(token)
            .map(|index| index as f64)
            .ok_or_else(|| format!("'{token}' is not a category of {}", attribute.name())),
    }
}

/// Split a comma separated list, honouring single and double quotes.
///
/// Unquoted tokens are trimmed; quotes are removed and `\` escapes the next
/// character inside a quoted token.
fn split_values(s: &str) -> std::result::Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut quoted_token = false;
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) if c == '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            Some(_) => current.push(c),
            None => match c {
                '\'' | '"' if current.trim().is_empty() => {
                    current.clear();
                    quote = Some(c);
                    quoted_token = true;
                }
                ',' => {
                    tokens.push(finish_token(&mut current, quoted_token));
                    quoted_token = false;
                }
                c if quoted_token && c.is_whitespace() => {}
                _ => current.push(c),
            },
        }
    }

    if quote.is_some() {
        return Err(format!("unterminated quote in '{s}'"));
    }
    if !current.trim().is_empty() || quoted_token || !tokens.is_empty() {
        tokens.push(finish_token(&mut current, quoted_token));
    }
    Ok(tokens)
}

fn finish_token(current: &mut String, quoted: bool) -> String {
    let token = if quoted {
        current.clone()
    } else {
        current.trim().to_string()
    };
    current.clear();
    token
}

#[cfg(test)]
#[path = "arff_tests.rs"]
mod tests;
