//! PostKit CLI - Command-line interface for resolving post links

use clap::{Parser, Subcommand, ValueEnum};
use postkit::{NormalizedRecord, Resolver, ResolverBuilder};
use std::io::{self, Read, Write};

/// Output format for resolve subcommand
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Markdown with YAML frontmatter
    #[default]
    Md,
    /// JSON format
    Json,
}

/// PostKit - resolve booru, Mastodon and Sharkey post links
#[derive(Parser, Debug)]
#[command(name = "postkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a post link and print the normalized record
    Resolve {
        /// Post URL
        url: String,

        /// Output format
        #[arg(long, short, default_value = "md")]
        output: OutputFormat,

        /// Custom User-Agent
        #[arg(long)]
        user_agent: Option<String>,

        /// Call APIs over the link's own scheme instead of forcing https
        #[arg(long)]
        allow_http: bool,
    },
    /// Report whether a domain runs Mastodon, Sharkey or neither
    Classify {
        /// Domain, with or without scheme
        domain: String,
    },
    /// Print every supported post link found in a message
    Links {
        /// Message text
        text: String,
    },
    /// Convert HTML to plain text or escaped Markdown
    Convert {
        /// HTML input; read from stdin when omitted
        html: Option<String>,

        /// Produce Telegram-escaped Markdown instead of plain text
        #[arg(long)]
        markdown: bool,
    },
    /// Print the JSON schema of a resolved record
    Schema,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    match cli.command {
        Commands::Resolve {
            url,
            output,
            user_agent,
            allow_http,
        } => {
            let mut builder = Resolver::builder().https_only(!allow_http);
            if let Some(ua) = user_agent {
                builder = builder.user_agent(ua);
            }
            run_resolve(&url, output, builder).await;
        }
        Commands::Classify { domain } => {
            let resolver = build_or_exit(Resolver::builder());
            writeln_safe(resolver.classify(&domain).await.as_str());
        }
        Commands::Links { text } => {
            let resolver = build_or_exit(Resolver::builder());
            for link in postkit::extract_links(&text) {
                if resolver.recognizes(&link) {
                    writeln_safe(&link);
                }
            }
        }
        Commands::Convert { html, markdown } => {
            let html = html.unwrap_or_else(read_stdin);
            let converted = if markdown {
                postkit::html_to_escaped_markdown(&html)
            } else {
                postkit::html_to_text(&html)
            };
            writeln_safe(&converted);
        }
        Commands::Schema => {
            let schema = schemars::schema_for!(NormalizedRecord);
            writeln_safe(&to_json_or_exit(&schema));
        }
    }
}

async fn run_resolve(url: &str, output: OutputFormat, builder: ResolverBuilder) {
    let resolver = build_or_exit(builder);

    match resolver.try_resolve(url).await {
        Ok(record) => match output {
            OutputFormat::Md => writeln_safe(&format_md_with_frontmatter(&record)),
            OutputFormat::Json => writeln_safe(&to_json_or_exit(&record)),
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn build_or_exit(builder: ResolverBuilder) -> Resolver {
    builder.build().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    })
}

fn to_json_or_exit<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing output: {}", e);
        std::process::exit(1);
    })
}

fn read_stdin() -> String {
    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        eprintln!("Error reading stdin: {}", e);
        std::process::exit(1);
    }
    input
}

/// Format a record as markdown with YAML frontmatter
fn format_md_with_frontmatter(record: &NormalizedRecord) -> String {
    let mut output = String::new();

    output.push_str("---\n");
    output.push_str(&format!("site: {}\n", record.site()));
    output.push_str(&format!("kind: {}\n", record.kind().as_str()));
    output.push_str(&format!("id: {}\n", record.id()));
    output.push_str(&format!("url: {}\n", record.url()));
    if let Some(author) = record.author() {
        output.push_str(&format!("author: {}\n", author));
    }
    if record.spoiler() {
        output.push_str("spoiler: true\n");
    }
    if !record.media().is_empty() {
        output.push_str("media:\n");
        for item in record.media() {
            output.push_str(&format!("  - {}: {}\n", item.kind.as_str(), item.locator));
        }
    }
    output.push_str("---\n");

    output.push_str(record.text());

    output
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
