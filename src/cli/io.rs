//! JSON-lines I/O for the CLI
//!
//! - Input: one JSON object per line; blank lines are skipped
//! - Output: one JSON object per line, flushed at the end of each command

use std::io::{BufRead, Write};

use serde::Serialize;

use crate::document::Document;

use super::errors::{CliError, CliResult};

/// Reads every document from `reader`. Stops at the first bad line.
pub fn read_documents(reader: impl BufRead) -> CliResult<Vec<Document>> {
    let mut documents = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let json: serde_json::Value =
            serde_json::from_str(&line).map_err(|e| CliError::Input {
                line: idx + 1,
                reason: e.to_string(),
            })?;
        let doc = Document::try_from(json).map_err(|e| CliError::Input {
            line: idx + 1,
            reason: e.to_string(),
        })?;
        documents.push(doc);
    }
    Ok(documents)
}

/// Parses a JSON object given as a command-line argument
pub fn parse_object_arg(flag: &'static str, text: &str) -> CliResult<Document> {
    let json: serde_json::Value = serde_json::from_str(text).map_err(|e| CliError::Argument {
        flag,
        reason: e.to_string(),
    })?;
    Document::try_from(json).map_err(|e| CliError::Argument {
        flag,
        reason: e.to_string(),
    })
}

pub fn write_line(writer: &mut impl Write, value: &impl Serialize) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, value).map_err(std::io::Error::from)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    #[test]
    fn test_read_documents_skips_blank_lines() {
        let input = Cursor::new("{\"a\":1}\n\n  \n{\"b\":[1,2]}\n");
        let docs = read_documents(input).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].to_json(), json!({"b": [1, 2]}));
    }

    #[test]
    fn test_read_documents_reports_line() {
        let input = Cursor::new("{\"a\":1}\n[1,2]\n");
        match read_documents(input).unwrap_err() {
            CliError::Input { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other:?}"),
        }

        let input = Cursor::new("{\"a\":\n");
        assert_eq!(read_documents(input).unwrap_err().code(), "DQ_CLI_INPUT");
    }

    #[test]
    fn test_parse_object_arg() {
        assert_eq!(
            parse_object_arg("spec", "{\"a\": 1}").unwrap().to_json(),
            json!({"a": 1})
        );
        assert_eq!(
            parse_object_arg("spec", "7").unwrap_err().code(),
            "DQ_CLI_ARGUMENT"
        );
    }

    #[test]
    fn test_write_line() {
        let mut out = Vec::new();
        write_line(&mut out, &json!({"a": 1})).unwrap();
        write_line(&mut out, &json!([1])).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\"a\":1}\n[1]\n");
    }
}
