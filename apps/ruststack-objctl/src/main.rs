//! objctl - run object operations against named S3 client configurations.
//!
//! Client settings are loaded from a JSON file and from environment
//! variables, resolved through the client factory, and each command runs
//! one wrapped operation. A failed operation prints its error kind and
//! message and exits with status 1.
//!
//! # Usage
//!
//! ```text
//! S3CLIENTS_FILE=clients.json objctl --client archive put reports ./q1.csv --name q1.csv
//! objctl --client archive get reports q1.csv --output ./q1.csv
//! objctl --client archive stat reports q1.csv --json
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `S3CLIENTS_FILE` | *(unset)* | JSON file mapping client names to settings |
//! | `S3CLIENTS__<name>__<Field>` | *(unset)* | Per-client setting, replaces the file entry |
//! | `LOG_LEVEL` | `warn` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod config;
mod fetch;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ruststack_client_core::{
    ClientFactory, Configure, DefaultMimeTypeMap, MimeTypeMap, ObjectStat, OperationResult,
    PutObjectArgs, ops,
};
use ruststack_client_s3::{S3Client, S3ClientBuilder};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::ObjctlConfig;
use crate::fetch::Fetch;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "objctl", version, about = "Object operations against named S3 clients")]
struct Cli {
    /// Name of the client settings to use.
    #[arg(short, long, default_value = "default")]
    client: String,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List configured client names.
    Clients,
    #[command(flatten)]
    Object(ObjectCommand),
}

/// Commands that run one object operation.
#[derive(Debug, Subcommand)]
enum ObjectCommand {
    /// Upload a file (or stdin when no file is given).
    Put {
        /// Target bucket.
        bucket: String,
        /// Source file; reads stdin when omitted.
        file: Option<PathBuf>,
        /// Object name; generated when omitted.
        #[arg(short, long)]
        name: Option<String>,
        /// Content type stored with the object.
        #[arg(short = 't', long, default_value = "application/octet-stream")]
        content_type: String,
        /// Append the extension mapped from the content type.
        #[arg(long)]
        auto_extension: bool,
        /// User metadata as `key=value`.
        #[arg(short, long = "meta", value_parser = parse_key_value)]
        metadata: Vec<(String, String)>,
    },
    /// Download an object to a file (or stdout).
    Get {
        /// Source bucket.
        bucket: String,
        /// Object name.
        object: String,
        /// Destination file; writes stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// First byte to read.
        #[arg(long)]
        offset: Option<u64>,
        /// Number of bytes to read; zero or omitted reads to the end.
        #[arg(long, requires = "offset")]
        length: Option<u64>,
        /// Version to read.
        #[arg(long)]
        version_id: Option<String>,
    },
    /// Show object metadata.
    Stat {
        /// Bucket holding the object.
        bucket: String,
        /// Object name.
        object: String,
    },
    /// Remove an object.
    Rm {
        /// Bucket holding the object.
        bucket: String,
        /// Object name.
        object: String,
    },
}

/// Object metadata as printed by `stat` and `get`.
#[derive(Debug, Serialize)]
struct StatView<'a> {
    bucket: &'a str,
    object: &'a str,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    etag: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version_id: Option<&'a str>,
}

impl<'a> From<&'a ObjectStat> for StatView<'a> {
    fn from(stat: &'a ObjectStat) -> Self {
        Self {
            bucket: &stat.bucket,
            object: &stat.object,
            size: stat.size,
            etag: stat.etag.as_deref(),
            content_type: stat.content_type.as_deref(),
            last_modified: stat.last_modified.map(|t| t.to_rfc3339()),
            version_id: stat.version_id.as_deref(),
        }
    }
}

/// Failure as printed with `--json`.
#[derive(Debug, Serialize)]
struct FailureView<'a> {
    kind: &'static str,
    message: &'a str,
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    Ok(())
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))
}

/// Print the outcome of an operation and turn it into an exit code.
fn report<T>(result: &OperationResult<T>, json: bool, on_success: impl FnOnce(&T)) -> ExitCode {
    let mut code = ExitCode::SUCCESS;
    result.handle(on_success, |kind, message| {
        if json {
            let view = FailureView {
                kind: kind.as_str(),
                message,
            };
            println!("{}", serde_json::to_string(&view).unwrap_or_default());
        } else {
            eprintln!("{kind}: {message}");
        }
        code = ExitCode::FAILURE;
    });
    code
}

fn print_stat(stat: &ObjectStat, json: bool) {
    let view = StatView::from(stat);
    if json {
        println!("{}", serde_json::to_string_pretty(&view).unwrap_or_default());
    } else {
        println!("{}/{}", view.bucket, view.object);
        println!("  size:          {}", view.size);
        if let Some(etag) = view.etag {
            println!("  etag:          {etag}");
        }
        if let Some(content_type) = view.content_type {
            println!("  content-type:  {content_type}");
        }
        if let Some(last_modified) = &view.last_modified {
            println!("  last-modified: {last_modified}");
        }
        if let Some(version_id) = view.version_id {
            println!("  version:       {version_id}");
        }
    }
}

/// Cancel `token` when Ctrl-C is received.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received interrupt, cancelling operation");
            token.cancel();
        }
    });
}

#[allow(clippy::too_many_lines)]
async fn run(command: ObjectCommand, client: &S3Client, json: bool, cancel: &CancellationToken) -> Result<ExitCode> {
    let code = match command {
        ObjectCommand::Put {
            bucket,
            file,
            name,
            content_type,
            auto_extension,
            metadata,
        } => {
            let mime_map: Option<&dyn MimeTypeMap> = if auto_extension {
                Some(&DefaultMimeTypeMap)
            } else {
                None
            };
            let configure: Configure<PutObjectArgs> = Box::new(move |args| {
                metadata
                    .into_iter()
                    .fold(args, |args, (k, v)| args.with_metadata(k, v))
            });

            let result = match file {
                Some(path) => {
                    let reader = tokio::fs::File::open(&path)
                        .await
                        .with_context(|| format!("cannot open {}", path.display()))?;
                    ops::put_stream(
                        client,
                        &bucket,
                        reader,
                        &content_type,
                        name.as_deref(),
                        mime_map,
                        Some(configure),
                        Some(cancel),
                    )
                    .await
                }
                None => {
                    ops::put_stream(
                        client,
                        &bucket,
                        tokio::io::stdin(),
                        &content_type,
                        name.as_deref(),
                        mime_map,
                        Some(configure),
                        Some(cancel),
                    )
                    .await
                }
            };

            report(&result, json, |output| {
                if json {
                    let value = serde_json::json!({
                        "bucket": output.bucket,
                        "object": output.object,
                        "size": output.size,
                        "etag": output.etag,
                        "versionId": output.version_id,
                    });
                    println!("{value}");
                } else {
                    println!("{}/{} ({} bytes)", output.bucket, output.object, output.size);
                }
            })
        }
        ObjectCommand::Get {
            bucket,
            object,
            output,
            offset,
            length,
            version_id,
        } => {
            let fetch = Fetch {
                bucket,
                object,
                offset,
                length,
                version_id,
            };
            let result = match &output {
                Some(path) => fetch.to_path(client, path, cancel).await?,
                None => fetch.to_writer(client, tokio::io::stdout(), cancel).await?,
            };

            // The payload goes to stdout without --output, so keep it clean.
            report(&result, json, |stat| {
                if output.is_some() {
                    print_stat(stat, json);
                }
            })
        }
        ObjectCommand::Stat { bucket, object } => {
            let result = ops::stat_object(client, &bucket, &object, None, Some(cancel)).await;
            report(&result, json, |stat| print_stat(stat, json))
        }
        ObjectCommand::Rm { bucket, object } => {
            let result = ops::remove_object(client, &bucket, &object, None, Some(cancel)).await;
            report(&result, json, |_| {
                if !json {
                    println!("removed {bucket}/{object}");
                }
            })
        }
    };
    Ok(code)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = ObjctlConfig::from_env();

    init_tracing(&config.log_level)?;

    let registry = config.load_registry()?;
    debug!(clients = registry.len(), "loaded client settings");

    let command = match cli.command {
        Command::Clients => {
            for name in registry.names() {
                println!("{name}");
            }
            return Ok(ExitCode::SUCCESS);
        }
        Command::Object(command) => command,
    };

    let factory = ClientFactory::new(registry);
    let client = factory
        .create_client::<S3ClientBuilder>(&cli.client)
        .with_context(|| format!("cannot create client {:?}", cli.client))?;

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    run(command, &client, cli.json, &cancel).await
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_should_have_valid_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_should_parse_put_command() {
        let cli = Cli::try_parse_from([
            "objctl",
            "--client",
            "archive",
            "put",
            "reports",
            "q1.csv",
            "--auto-extension",
            "-t",
            "text/csv",
            "--meta",
            "owner=ops",
        ])
        .expect("valid args");

        assert_eq!(cli.client, "archive");
        let Command::Object(ObjectCommand::Put {
            bucket,
            file,
            auto_extension,
            content_type,
            metadata,
            ..
        }) = cli.command
        else {
            panic!("expected put");
        };
        assert_eq!(bucket, "reports");
        assert_eq!(file, Some(PathBuf::from("q1.csv")));
        assert!(auto_extension);
        assert_eq!(content_type, "text/csv");
        assert_eq!(metadata, vec![("owner".to_owned(), "ops".to_owned())]);
    }

    #[test]
    fn test_should_require_offset_for_length() {
        assert!(Cli::try_parse_from(["objctl", "get", "b", "o", "--length", "5"]).is_err());
        assert!(
            Cli::try_parse_from(["objctl", "get", "b", "o", "--offset", "1", "--length", "5"])
                .is_ok()
        );
    }

    #[test]
    fn test_should_reject_malformed_metadata() {
        assert!(parse_key_value("novalue").is_err());
        assert_eq!(
            parse_key_value("a=b=c"),
            Ok(("a".to_owned(), "b=c".to_owned()))
        );
    }

    #[test]
    fn test_should_report_failure_exit_code() {
        let failed = OperationResult::<()>::failure(
            ruststack_client_core::ErrorKind::BucketNotFound,
            "no such bucket",
        );
        assert_eq!(report(&failed, false, |_| {}), ExitCode::FAILURE);

        let ok = OperationResult::success(());
        assert_eq!(report(&ok, false, |_| {}), ExitCode::SUCCESS);
    }

    #[test]
    fn test_should_serialize_stat_view() {
        let stat = ObjectStat {
            bucket: "b".to_owned(),
            object: "o".to_owned(),
            size: 3,
            etag: Some("\"abc\"".to_owned()),
            ..ObjectStat::default()
        };
        let json = serde_json::to_value(StatView::from(&stat)).expect("serialize");
        assert_eq!(json["size"], 3);
        assert_eq!(json["etag"], "\"abc\"");
        assert!(json.get("versionId").is_none() && json.get("version_id").is_none());
    }
}
