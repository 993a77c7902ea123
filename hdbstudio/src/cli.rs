//! Command-line definition.

use clap::{Args, Parser, Subcommand};
use hdbstudio_core::config::DEFAULT_SAMPLE_SIZE;
use hdbstudio_core::transport::HdbRequest;
use hdbstudio_core::{HdbStudioError, QuerySource, query};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "hdbstudio")]
#[command(about = "HarperDB reporting connector")]
#[command(version)]
#[command(long_about = "
hdbstudio - schema inference and row projection for HarperDB

Turns the result of an SQL query against a schemaless HarperDB table into a
flat, typed table a reporting tool can chart.

SECURITY FEATURES:
- Auth tokens are never logged or written to output
- Endpoint passwords are redacted in logs
- Queries are stripped of comments and trailing statements and row-capped

EXAMPLES:
  hdbstudio sanitize \"SELECT * FROM dev.dog LIMIT 5000; DROP TABLE dev.dog\"
  hdbstudio schema --input records.json --table dev.dog
  hdbstudio data --input records.json --sql \"SELECT * FROM dev.dog\" --fields name,record_count
  HDB_AUTH=... hdbstudio request --url db.example.com:9925 --secure --table dev.dog
  HDB_AUTH=... hdbstudio request --url db.example.com:9925 --describe-table dev.dog
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a query after comment stripping and row capping
    Sanitize(SanitizeArgs),
    /// Infer the column schema of a record set
    Schema(SchemaArgs),
    /// Project a record set onto requested columns
    Data(DataArgs),
    /// Show the request that would be sent to a HarperDB endpoint
    Request(RequestArgs),
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    pub quiet: bool,
}

#[derive(Debug, Args)]
pub struct SanitizeArgs {
    /// Query text to sanitize
    pub sql: String,

    /// Row cap applied to the LIMIT clause
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    pub max_rows: u32,
}

/// Where the query comes from: free SQL or a whole table.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// SQL statement to run
    #[arg(long, conflicts_with = "table", required_unless_present = "table")]
    pub sql: Option<String>,

    /// Table to read, as `schema.table`
    #[arg(long)]
    pub table: Option<String>,
}

impl SourceArgs {
    /// Builds the query source.
    ///
    /// # Errors
    /// Returns a configuration error when `--table` is not `schema.table`.
    pub fn to_source(&self) -> hdbstudio_core::Result<QuerySource> {
        if let Some(sql) = &self.sql {
            return Ok(QuerySource::sql(sql.clone()));
        }

        let (schema, table) = parse_table(self.table.as_deref().unwrap_or_default())?;
        Ok(QuerySource::table(schema, table))
    }
}

/// Splits `schema.table` into its two non-empty parts.
fn parse_table(text: &str) -> hdbstudio_core::Result<(&str, &str)> {
    match text.split_once('.') {
        Some((schema, table)) if !schema.is_empty() && !table.is_empty() => Ok((schema, table)),
        _ => Err(HdbStudioError::configuration(format!(
            "table must be given as schema.table, got '{}'",
            text
        ))),
    }
}

/// Operation the `request` command builds. Exactly one must be given.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct RequestTarget {
    /// SQL statement to run
    #[arg(long)]
    pub sql: Option<String>,

    /// Table to read, as `schema.table`
    #[arg(long)]
    pub table: Option<String>,

    /// Schema whose tables to list
    #[arg(long, value_name = "SCHEMA")]
    pub describe_schema: Option<String>,

    /// Table to describe, as `schema.table`
    #[arg(long, value_name = "SCHEMA.TABLE")]
    pub describe_table: Option<String>,
}

impl RequestTarget {
    /// Builds the operation body, sanitizing and capping SQL to `max_rows`.
    ///
    /// # Errors
    /// Returns a configuration error for a blank schema, a malformed
    /// `schema.table` or a query that is empty after sanitizing.
    pub fn to_request(&self, max_rows: u32) -> hdbstudio_core::Result<HdbRequest> {
        if let Some(schema) = &self.describe_schema {
            let schema = schema.trim();
            if schema.is_empty() {
                return Err(HdbStudioError::configuration("schema name is blank"));
            }
            return Ok(HdbRequest::describe_schema(schema));
        }
        if let Some(text) = &self.describe_table {
            let (schema, table) = parse_table(text.trim())?;
            return Ok(HdbRequest::describe_table(schema, table));
        }

        let source = SourceArgs {
            sql: self.sql.clone(),
            table: self.table.clone(),
        }
        .to_source()?;
        let text = source.to_query_text()?;
        Ok(HdbRequest::sql(query::prepare(&text, max_rows)))
    }
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// JSON file holding the operation response (an array of records)
    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Records analyzed for inference
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    pub sample_size: u32,

    /// Output file (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct DataArgs {
    /// JSON file holding the operation response (an array of records)
    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Comma-separated column names, in output order
    #[arg(long, value_delimiter = ',', required = true)]
    pub fields: Vec<String>,

    /// Maximum rows to project
    #[arg(long, default_value_t = hdbstudio_core::MAX_ROWS_LIMIT)]
    pub max_rows: u32,

    /// Records analyzed for inference
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    pub sample_size: u32,

    /// Output file (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RequestArgs {
    /// HarperDB endpoint
    #[arg(long, env = "HDB_URL", help = "Endpoint URL (credentials are redacted in logs)")]
    pub url: Option<String>,

    /// Basic auth token
    #[arg(long, env = "HDB_AUTH", hide_env_values = true)]
    pub key: Option<String>,

    /// Use https even when the URL says http
    #[arg(long)]
    pub secure: bool,

    /// Accept self-signed or otherwise invalid certificates
    #[arg(long)]
    pub allow_bad_certs: bool,

    #[command(flatten)]
    pub target: RequestTarget,

    /// Row cap applied to the LIMIT clause of SQL requests
    #[arg(long, default_value_t = hdbstudio_core::MAX_ROWS_LIMIT)]
    pub max_rows: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_table_source_parsing() {
        let args = SourceArgs {
            sql: None,
            table: Some("dev.dog".to_string()),
        };
        assert_eq!(args.to_source().unwrap(), QuerySource::table("dev", "dog"));

        for bad in ["dog", ".dog", "dev."] {
            let args = SourceArgs {
                sql: None,
                table: Some(bad.to_string()),
            };
            assert!(args.to_source().is_err(), "table {:?}", bad);
        }
    }

    #[test]
    fn test_data_fields_are_split() {
        let cli = Cli::try_parse_from([
            "hdbstudio",
            "data",
            "--input",
            "records.json",
            "--sql",
            "SELECT 1",
            "--fields",
            "name,record_count",
        ])
        .unwrap();

        match cli.command {
            Command::Data(args) => {
                assert_eq!(args.fields, vec!["name", "record_count"]);
                assert_eq!(args.max_rows, 1_000_000);
            }
            other => panic!("expected data command, got {:?}", other),
        }
    }

    #[test]
    fn test_source_is_required() {
        let result = Cli::try_parse_from(["hdbstudio", "schema", "--input", "records.json"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from([
            "hdbstudio", "schema", "--input", "r.json", "--sql", "SELECT 1", "--table", "a.b",
        ]);
        assert!(result.is_err());
    }

    fn parse_request(extra: &[&str]) -> Result<RequestArgs, clap::Error> {
        let mut argv = vec!["hdbstudio", "request", "--url", "db:9925"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv)?.command {
            Command::Request(args) => Ok(args),
            other => panic!("expected request command, got {:?}", other),
        }
    }

    #[test]
    fn test_request_describe_options() {
        let args = parse_request(&["--describe-schema", "dev"]).unwrap();
        assert_eq!(
            args.target.to_request(args.max_rows).unwrap(),
            HdbRequest::describe_schema("dev")
        );

        let args = parse_request(&["--describe-table", "dev.dog"]).unwrap();
        assert_eq!(
            args.target.to_request(args.max_rows).unwrap(),
            HdbRequest::describe_table("dev", "dog")
        );

        let args = parse_request(&["--describe-table", "dog"]).unwrap();
        assert!(args.target.to_request(args.max_rows).is_err());

        let args = parse_request(&["--describe-schema", " "]).unwrap();
        assert!(args.target.to_request(args.max_rows).is_err());
    }

    #[test]
    fn test_request_sql_is_prepared() {
        let args = parse_request(&["--table", "dev.dog", "--max-rows", "5"]).unwrap();
        let request = args.target.to_request(args.max_rows).unwrap();
        assert_eq!(request.operation(), "sql");
        assert!(request.sql_text().is_some_and(|sql| sql.ends_with("LIMIT 5")));
    }

    #[test]
    fn test_request_takes_exactly_one_target() {
        assert!(parse_request(&[]).is_err());
        assert!(parse_request(&["--sql", "SELECT 1", "--describe-schema", "dev"]).is_err());
        let both = ["--describe-schema", "dev", "--describe-table", "dev.dog"];
        assert!(parse_request(&both).is_err());
    }
}
