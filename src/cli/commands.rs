//! CLI command implementations
//!
//! Every command reads all of stdin as JSON lines, runs, then writes its
//! output as JSON lines to stdout.

use std::io::{self, BufRead, Write};
use std::path::Path;

use serde_json::json;
use tracing::{info, warn};

use crate::accumulator::AccumulatorOptions;
use crate::config::EngineConfig;
use crate::context::ExecutionContext;
use crate::exec::{
    BoxedStage, GroupSpec, GroupStage, LimitStage, ProjectionStage, QueuedDataStage, RouterStage,
    SkipStage,
};
use crate::index::{MultikeyPaths, WildcardKeyGenerator, WildcardPattern};
use crate::observability::{self, Event};
use crate::projection::Projection;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{parse_object_arg, read_documents, write_line};

/// Parses process arguments and runs against stdin/stdout
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_command(cli, stdin.lock(), &mut out)?;
    out.flush()?;
    Ok(())
}

/// Dispatches one parsed command
pub fn run_command(cli: Cli, input: impl BufRead, output: &mut impl Write) -> CliResult<()> {
    let config = load_config(cli.config.as_deref())?;
    let ctx = ExecutionContext::new();

    match cli.command {
        Command::Keys {
            pattern,
            projection,
        } => keys(&config, &ctx, &pattern, projection.as_deref(), input, output),
        Command::Project { spec, skip, limit } => {
            project(&ctx, &spec, skip, limit, input, output)
        }
        Command::Group { by, acc } => group(&config, &ctx, &by, &acc, input, output),
    }?;

    info!(
        event = %Event::CommandComplete,
        op_id = %ctx.op_id(),
        metrics = ?observability::metrics().snapshot(),
    );
    Ok(())
}

fn load_config(path: Option<&Path>) -> CliResult<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path).map_err(CliError::engine),
        None => Ok(EngineConfig::default()),
    }
}

/// One line per document, then `{"multikey_paths": [...]}`.
///
/// A rejected document gets an error line and the run continues.
fn keys(
    config: &EngineConfig,
    ctx: &ExecutionContext,
    pattern: &str,
    projection: Option<&str>,
    input: impl BufRead,
    output: &mut impl Write,
) -> CliResult<()> {
    let mut pattern = WildcardPattern::parse(pattern).map_err(CliError::engine)?;
    if let Some(projection) = projection {
        let projection = parse_object_arg("projection", projection)?;
        pattern = pattern
            .with_projection(&projection)
            .map_err(CliError::engine)?;
    }
    let generator = WildcardKeyGenerator::new(pattern, config);

    let mut multikey = MultikeyPaths::new();
    for (record, doc) in read_documents(input)?.iter().enumerate() {
        match generator.generate(doc, ctx) {
            Ok(generated) => {
                multikey.absorb(&generated.multikey_paths);
                write_line(output, &json!({"record": record, "keys": generated.keys}))?;
            }
            Err(err) if err.class().is_recoverable() => {
                write_line(
                    output,
                    &json!({
                        "record": record,
                        "error": {"code": err.code(), "message": err.to_string()},
                    }),
                )?;
            }
            Err(err) => return Err(CliError::engine(err)),
        }
    }
    write_line(output, &json!({ "multikey_paths": multikey }))
}

fn project(
    ctx: &ExecutionContext,
    spec: &str,
    skip: Option<i64>,
    limit: Option<i64>,
    input: impl BufRead,
    output: &mut impl Write,
) -> CliResult<()> {
    let spec = parse_object_arg("spec", spec)?;
    let projection = Projection::parse(&spec).map_err(CliError::engine)?;

    let mut stage: BoxedStage = Box::new(QueuedDataStage::from_documents(read_documents(input)?));
    if let Some(skip) = skip {
        stage = Box::new(SkipStage::new(ctx.clone(), stage, skip).map_err(CliError::engine)?);
    }
    if let Some(limit) = limit {
        stage = Box::new(LimitStage::new(ctx.clone(), stage, limit).map_err(CliError::engine)?);
    }
    let mut stage = ProjectionStage::new(ctx.clone(), stage, projection);

    drain(&mut stage, output)
}

fn group(
    config: &EngineConfig,
    ctx: &ExecutionContext,
    by: &str,
    acc: &str,
    input: impl BufRead,
    output: &mut impl Write,
) -> CliResult<()> {
    let acc = parse_object_arg("acc", acc)?;
    let spec = GroupSpec::parse(by, &acc, AccumulatorOptions::from(config))
        .map_err(CliError::engine)?;

    let child = QueuedDataStage::from_documents(read_documents(input)?);
    let mut stage = GroupStage::new(ctx.clone(), Box::new(child), spec);

    drain(&mut stage, output)
}

fn drain(stage: &mut dyn RouterStage, output: &mut impl Write) -> CliResult<()> {
    loop {
        match stage.next() {
            Ok(Some(result)) => write_line(output, result.document())?,
            Ok(None) => return Ok(()),
            Err(err) => {
                warn!(event = %Event::CommandFailed, code = err.code(), error = %err);
                stage.kill();
                return Err(CliError::engine(err));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::Value as Json;
    use std::io::Cursor;

    fn run_lines(args: &[&str], input: &str) -> CliResult<Vec<Json>> {
        let cli = Cli::try_parse_from(std::iter::once("docquery").chain(args.iter().copied()))
            .unwrap();
        let mut out = Vec::new();
        run_command(cli, Cursor::new(input.to_string()), &mut out)?;
        Ok(String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect())
    }

    #[test]
    fn test_keys_command() {
        let out = run_lines(&["keys"], "{\"_id\": 1, \"a\": [1, 2, 2]}\n{\"b\": true}\n").unwrap();
        assert_eq!(
            out,
            vec![
                json!({"record": 0, "keys": [
                    {"path": "a", "value": 1},
                    {"path": "a", "value": 2},
                ]}),
                json!({"record": 1, "keys": [{"path": "b", "value": true}]}),
                json!({"multikey_paths": ["a"]}),
            ]
        );
    }

    #[test]
    fn test_keys_reports_rejected_document_and_continues() {
        let big = "x".repeat(2000);
        let input = format!("{{\"a\": \"{big}\"}}\n{{\"a\": 1}}\n");
        let out = run_lines(&["keys"], &input).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0]["error"]["code"], json!("DQ_KEY_TOO_LARGE"));
        assert_eq!(out[1]["keys"], json!([{"path": "a", "value": 1}]));
    }

    #[test]
    fn test_keys_rejects_bad_pattern() {
        let err = run_lines(&["keys", "--pattern", "a.b"], "").unwrap_err();
        assert_eq!(err.code(), "DQ_INVALID_WILDCARD_PATTERN");
    }

    #[test]
    fn test_project_command_with_skip_and_limit() {
        let input = "{\"_id\":1,\"a\":1,\"b\":1}\n{\"_id\":2,\"a\":2}\n{\"_id\":3,\"a\":3}\n{\"_id\":4,\"a\":4}\n";
        let out = run_lines(
            &["project", "--spec", "{\"a\":1,\"_id\":0}", "--skip", "1", "--limit", "2"],
            input,
        )
        .unwrap();
        assert_eq!(out, vec![json!({"a": 2}), json!({"a": 3})]);
    }

    #[test]
    fn test_project_rejects_non_positive_skip() {
        let err = run_lines(&["project", "--spec", "{}", "--skip", "0"], "").unwrap_err();
        assert_eq!(err.code(), "DQ_INVALID_STAGE_PARAMETER");
    }

    #[test]
    fn test_group_command() {
        let input = "{\"k\":\"x\",\"n\":3}\n{\"k\":\"y\",\"n\":7}\n{\"k\":\"x\",\"n\":2}\n";
        let out = run_lines(
            &["group", "--by", "k", "--acc", "{\"last\":{\"$last\":\"$n\"}}"],
            input,
        )
        .unwrap();
        assert_eq!(
            out,
            vec![json!({"_id": "x", "last": 2}), json!({"_id": "y", "last": 7})]
        );
    }

    #[test]
    fn test_config_file_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, "{\"max_key_bytes\": 8}").unwrap();

        let out = run_lines(
            &["keys", "--config", path.to_str().unwrap()],
            "{\"a\": \"long enough\"}\n",
        )
        .unwrap();
        assert_eq!(out[0]["error"]["code"], json!("DQ_KEY_TOO_LARGE"));
    }

    #[test]
    fn test_bad_input_line_is_fatal() {
        let err = run_lines(&["group", "--by", "k", "--acc", "{}"], "not json\n").unwrap_err();
        assert_eq!(err.code(), "DQ_CLI_INPUT");
    }
}
