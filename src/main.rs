//! localblob CLI - Command line interface for localblob
//!
//! Provides commands for managing containers and blobs in a local store.
//! Results are printed as JSON so the tool can be scripted from test harnesses.

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use localblob::{
    Blob, BlobMetadata, BlobStore, GetOptions, ListOptions, StorageMetadata, StoreConfig,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "localblob")]
#[command(about = "A local S3-style blob store")]
#[command(version)]
struct Cli {
    /// Store directory (overrides the config file and selects the filesystem backend)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Config file (default: ~/.config/localblob/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format (json or text)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    // === Container Commands ===
    /// List all containers
    Containers,

    /// Create a container
    Mk {
        /// Container name
        container: String,
        /// Location tag
        #[arg(short, long)]
        location: Option<String>,
        /// Fail if the container already exists
        #[arg(long)]
        strict: bool,
    },

    /// Delete a container and its blobs
    Rmc {
        /// Container name
        container: String,
        /// Only delete the container if it holds no blobs
        #[arg(long)]
        if_empty: bool,
    },

    /// Remove every blob from a container
    Clear {
        /// Container name
        container: String,
    },

    /// Create a directory placeholder
    Mkdir {
        /// Container name
        container: String,
        /// Directory path
        path: String,
    },

    // === Blob Commands ===
    /// Store a blob from a file, inline data or stdin
    Put {
        /// Container name
        container: String,
        /// Blob key
        key: String,
        /// Read the payload from this file
        #[arg(short = 'F', long, conflicts_with = "data")]
        file: Option<PathBuf>,
        /// Use this string as the payload
        #[arg(long)]
        data: Option<String>,
        /// Content type
        #[arg(short = 't', long)]
        content_type: Option<String>,
        /// User metadata as key=value (repeatable)
        #[arg(short = 'm', long = "meta", value_parser = parse_key_val)]
        metadata: Vec<(String, String)>,
    },

    /// Fetch a blob's payload
    Get {
        /// Container name
        container: String,
        /// Blob key
        key: String,
        /// Byte range such as 0-99, 100- or -50 (repeatable)
        #[arg(short, long)]
        range: Vec<String>,
        #[arg(long)]
        if_match: Option<String>,
        #[arg(long)]
        if_none_match: Option<String>,
        /// RFC 3339 or RFC 2822 timestamp
        #[arg(long, value_parser = parse_time)]
        if_modified_since: Option<DateTime<Utc>>,
        /// RFC 3339 or RFC 2822 timestamp
        #[arg(long, value_parser = parse_time)]
        if_unmodified_since: Option<DateTime<Utc>>,
        /// Write the payload to this file and print metadata instead
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show a blob's metadata
    Head {
        /// Container name
        container: String,
        /// Blob key
        key: String,
    },

    /// List a container
    Ls {
        /// Container name
        container: String,
        /// Only names starting with this prefix
        #[arg(short, long)]
        prefix: Option<String>,
        /// Continue after this name
        #[arg(long)]
        marker: Option<String>,
        /// Page size
        #[arg(short = 'n', long, default_value = "1000")]
        max: usize,
        /// Do not fold names into directories
        #[arg(short, long)]
        recursive: bool,
        /// Include user metadata
        #[arg(short = 'l', long)]
        detailed: bool,
    },

    /// Remove a blob
    Rm {
        /// Container name
        container: String,
        /// Blob key
        key: String,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "localblob=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        let cause = err.downcast_ref::<localblob::Error>();
        let status = cause.and_then(localblob::Error::http_status);
        let not_found = cause.is_some_and(localblob::Error::is_not_found);
        output(
            &cli.format,
            &serde_json::json!({
                "status": "error",
                "code": status,
                "not_found": not_found,
                "message": format!("{:#}", err)
            }),
        );
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let store = open_store(cli)?;

    match &cli.command {
        Commands::Containers => {
            let page = store.list_containers()?;
            let containers: Vec<_> = page.entries.iter().map(entry_json).collect();
            output(&cli.format, &serde_json::json!({ "containers": containers }));
        }

        Commands::Mk {
            container,
            location,
            strict,
        } => {
            let created = if *strict {
                store.create_container_if_absent_or_fail(container, location.as_deref())?;
                true
            } else {
                store.create_container_in_location(container, location.as_deref())?
            };
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "container": container,
                    "created": created
                }),
            );
        }

        Commands::Rmc {
            container,
            if_empty,
        } => {
            let deleted = if *if_empty {
                store.delete_container_if_empty(container)?
            } else {
                store.delete_container(container)?;
                true
            };
            let status = if deleted { "ok" } else { "not_empty" };
            output(
                &cli.format,
                &serde_json::json!({
                    "status": status,
                    "container": container,
                    "deleted": deleted
                }),
            );
            if !deleted {
                std::process::exit(1);
            }
        }

        Commands::Clear { container } => {
            store.clear_container(container)?;
            output(
                &cli.format,
                &serde_json::json!({ "status": "ok", "container": container }),
            );
        }

        Commands::Mkdir { container, path } => {
            store.create_directory(container, path)?;
            output(
                &cli.format,
                &serde_json::json!({ "status": "ok", "container": container, "directory": path }),
            );
        }

        Commands::Put {
            container,
            key,
            file,
            data,
            content_type,
            metadata,
        } => {
            let mut blob = match (file, data) {
                (Some(path), _) => Blob::new(
                    key.as_str(),
                    std::fs::read(path)
                        .with_context(|| format!("Failed to read {}", path.display()))?,
                ),
                (None, Some(data)) => Blob::new(key.as_str(), data.clone().into_bytes()),
                (None, None) => Blob::from_reader(key.as_str(), std::io::stdin().lock())
                    .context("Failed to read payload from stdin")?,
            };
            if let Some(content_type) = content_type {
                blob = blob.with_content_type(content_type.as_str());
            }
            for (k, v) in metadata {
                blob = blob.with_user_metadata(k.as_str(), v.as_str());
            }

            let size = blob.size();
            let etag = store.put_blob(container, blob)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "container": container,
                    "key": key,
                    "etag": etag.to_hex(),
                    "size": size
                }),
            );
        }

        Commands::Get {
            container,
            key,
            range,
            if_match,
            if_none_match,
            if_modified_since,
            if_unmodified_since,
            output: out_path,
        } => {
            let options = GetOptions {
                if_match: if_match.clone(),
                if_none_match: if_none_match.clone(),
                if_modified_since: *if_modified_since,
                if_unmodified_since: *if_unmodified_since,
                ranges: range.clone(),
            };

            let Some(blob) = store.get_blob(container, key, &options)? else {
                return Err(localblob::Error::KeyNotFound {
                    container: container.clone(),
                    key: key.clone(),
                }
                .into());
            };

            match out_path {
                Some(path) => {
                    write_payload(path, &blob.payload)?;
                    output(&cli.format, &metadata_json(&blob.metadata));
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&blob.payload)?;
                    stdout.flush()?;
                }
            }
        }

        Commands::Head { container, key } => {
            let metadata = store.blob_metadata(container, key)?;
            output(&cli.format, &metadata_json(&metadata));
        }

        Commands::Ls {
            container,
            prefix,
            marker,
            max,
            recursive,
            detailed,
        } => {
            let mut options = ListOptions::new().max_results(*max).after(marker.clone());
            if let Some(prefix) = prefix {
                options = options.prefix(prefix.as_str());
            }
            if *recursive {
                options = options.recursive();
            }
            if *detailed {
                options = options.detailed();
            }

            let page = store.list(container, &options)?;
            let entries: Vec<_> = page.entries.iter().map(entry_json).collect();
            output(
                &cli.format,
                &serde_json::json!({
                    "container": container,
                    "entries": entries,
                    "next_marker": page.next_marker
                }),
            );
        }

        Commands::Rm { container, key } => {
            store.remove_blob(container, key)?;
            output(
                &cli.format,
                &serde_json::json!({ "status": "ok", "container": container, "key": key }),
            );
        }
    }

    Ok(())
}

fn open_store(cli: &Cli) -> anyhow::Result<BlobStore> {
    let mut config = StoreConfig::load_or_default(cli.config.as_deref())?;
    if let Some(dir) = &cli.dir {
        config.backend = localblob::Backend::Filesystem;
        config.base_dir = Some(dir.clone());
    }
    Ok(config.open()?)
}

fn write_payload(path: &Path, payload: &[u8]) -> anyhow::Result<()> {
    std::fs::write(path, payload).with_context(|| format!("Failed to write {}", path.display()))
}

fn metadata_json(md: &BlobMetadata) -> serde_json::Value {
    serde_json::json!({
        "name": md.name,
        "container": md.container,
        "etag": md.etag.to_hex(),
        "size": md.size(),
        "content_type": md.content.content_type,
        "directory": md.is_directory_marker(),
        "last_modified": md.last_modified.to_rfc3339(),
        "user_metadata": md.user_metadata,
        "uri": md.uri
    })
}

fn entry_json(entry: &StorageMetadata) -> serde_json::Value {
    serde_json::json!({
        "kind": entry.kind,
        "name": entry.name,
        "etag": entry.etag.map(|e| e.to_hex()),
        "size": entry.size,
        "last_modified": entry.last_modified.map(|t| t.to_rfc3339()),
        "location": entry.location,
        "user_metadata": entry.user_metadata
    })
}

fn output(format: &OutputFormat, value: &serde_json::Value) {
    let text = match format {
        OutputFormat::Json => serde_json::to_string(value),
        OutputFormat::Text => serde_json::to_string_pretty(value),
    };
    // Value serialization cannot fail: all map keys are strings
    println!("{}", text.unwrap_or_default());
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got {:?}", s))
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_rfc2822(s))
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp {:?}: {}", s, e))
}
