//! Command-line argument parsing

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// docquery - wildcard index keys, projections and grouping over JSON lines
#[derive(Parser, Debug)]
#[command(name = "docquery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to an engine configuration file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print the wildcard index keys of each stdin document
    Keys {
        /// Wildcard pattern: `$**` or `<path>.$**`
        #[arg(long, default_value = "$**")]
        pattern: String,

        /// Field projection for the whole-document pattern, e.g. '{"a": 1}'
        #[arg(long, value_name = "JSON")]
        projection: Option<String>,
    },

    /// Project stdin documents through an optional skip and limit
    Project {
        /// Projection spec, e.g. '{"a": 1, "b.c": 0}'
        #[arg(long, value_name = "JSON")]
        spec: String,

        /// Results to discard first
        #[arg(long, allow_negative_numbers = true)]
        skip: Option<i64>,

        /// Maximum results to return
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },

    /// Group stdin documents and fold each group with accumulators
    Group {
        /// Group key path, e.g. `k` or `$k.sub`
        #[arg(long)]
        by: String,

        /// Accumulators, e.g. '{"total": {"$sum": "$qty"}}'
        #[arg(long, value_name = "JSON")]
        acc: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_project() {
        let cli = Cli::try_parse_from([
            "docquery", "project", "--spec", "{\"a\":1}", "--skip", "2", "--limit", "-1",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Project {
                spec: "{\"a\":1}".into(),
                skip: Some(2),
                limit: Some(-1),
            }
        );
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_keys_defaults_to_whole_document() {
        let cli = Cli::try_parse_from(["docquery", "keys", "--config", "engine.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("engine.json")));
        assert_eq!(
            cli.command,
            Command::Keys {
                pattern: "$**".into(),
                projection: None,
            }
        );
    }

    #[test]
    fn test_group_requires_by() {
        assert!(Cli::try_parse_from(["docquery", "group", "--acc", "{}"]).is_err());
    }
}
