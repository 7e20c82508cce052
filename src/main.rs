// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! hostdom CLI
//!
//! Runs the reference host over stdin/stdout and offers a few inspection
//! commands built on node proxies.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use hostdom::{DocumentHost, Error, ErrorContext, Node, Result, RuntimeContext};

fn main() -> ExitCode {
    // stdout carries the wire protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hostdom=info".parse().unwrap()),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "serve" => match ServeOptions::parse(&args[2..]) {
            Ok(options) => serve(&options),
            Err(e) => {
                eprintln!("{}", e);
                eprintln!("Usage: hostdom serve <file.html> [--url <base>] [--offline]");
                return ExitCode::from(1);
            }
        },
        "query" => {
            if args.len() < 4 {
                eprintln!("Usage: hostdom query <file.html> <selector>");
                return ExitCode::from(1);
            }
            query(Path::new(&args[2]), &args[3], &mut io::stdout().lock()).map(|_| ())
        }
        "tree" => {
            if args.len() < 3 {
                eprintln!("Usage: hostdom tree <file.html>");
                return ExitCode::from(1);
            }
            tree(Path::new(&args[2]), &mut io::stdout().lock())
        }
        "--help" | "-h" | "help" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "--version" | "-v" | "version" => {
            println!("hostdom {}", hostdom::VERSION);
            return ExitCode::SUCCESS;
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            return ExitCode::from(1);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"hostdom - Host-delegated DOM runtime

USAGE:
    hostdom <COMMAND> [OPTIONS]

COMMANDS:
    serve <file.html>            Serve the document over stdin/stdout (JSON lines)
        --url <base>             Base URL for XMLHttpRequest targets
        --offline                Reject XMLHttpRequest instead of fetching
    query <file.html> <sel>      Print the outer HTML of every match
    tree <file.html>             Print the element tree
    help                         Show this help message
    version                      Show version information

EXAMPLES:
    hostdom serve guestbook.html --url http://localhost:8000/
    hostdom query guestbook.html "form input[name]"
    RUST_LOG=hostdom=debug hostdom tree guestbook.html
"#
    );
}

/// Options of the `serve` command
#[derive(Debug, Clone, PartialEq, Eq)]
struct ServeOptions {
    path: String,
    url: Option<String>,
    offline: bool,
}

impl ServeOptions {
    fn parse(args: &[String]) -> Result<Self> {
        let mut path = None;
        let mut url = None;
        let mut offline = false;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--url" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| Error::Config("--url needs a value".into()))?;
                    url = Some(value.clone());
                }
                "--offline" => offline = true,
                flag if flag.starts_with("--") => {
                    return Err(Error::Config(format!("unknown option {}", flag)));
                }
                file if path.is_none() => path = Some(file.to_string()),
                extra => return Err(Error::Config(format!("unexpected argument {}", extra))),
            }
        }

        Ok(Self {
            path: path.ok_or_else(|| Error::Config("missing document path".into()))?,
            url,
            offline,
        })
    }
}

fn load_host(path: &Path) -> Result<DocumentHost> {
    let html = fs::read_to_string(path).context(&format!("reading {}", path.display()))?;
    DocumentHost::parse(&html)
}

#[cfg(feature = "http")]
fn attach_fetcher(host: DocumentHost, offline: bool) -> Result<DocumentHost> {
    if offline {
        return Ok(host);
    }
    Ok(host.with_fetcher(hostdom::HttpFetcher::new()?))
}

#[cfg(not(feature = "http"))]
fn attach_fetcher(host: DocumentHost, _offline: bool) -> Result<DocumentHost> {
    Ok(host)
}

fn serve(options: &ServeOptions) -> Result<()> {
    let mut host = load_host(Path::new(&options.path))?;
    if let Some(url) = &options.url {
        host = host.with_url(url)?;
    }
    let host = attach_fetcher(host, options.offline)?;

    tracing::info!(path = %options.path, offline = options.offline, "serving document");
    let stdin = io::stdin();
    let served = hostdom::serve(&host, stdin.lock(), io::stdout().lock())?;
    tracing::info!(requests = served, "input closed");
    Ok(())
}

/// Print the outer HTML of every element matching `selector`
fn query(path: &Path, selector: &str, out: &mut impl Write) -> Result<usize> {
    let ctx = RuntimeContext::with_defaults(Arc::new(load_host(path)?));
    let matches = ctx.document().query_selector_all(selector)?;
    for node in &matches {
        writeln!(out, "{}", node.outer_html()?)?;
    }
    Ok(matches.len())
}

/// Print the element tree, one open tag per line
fn tree(path: &Path, out: &mut impl Write) -> Result<()> {
    let ctx = RuntimeContext::with_defaults(Arc::new(load_host(path)?));
    if let Some(root) = ctx.document().query_selector(":root")? {
        print_node(&root, 0, out)?;
    }
    Ok(())
}

fn print_node(node: &Node, depth: usize, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}{}", "  ".repeat(depth), node.to_host_string()?)?;
    for child in node.children()? {
        print_node(&child, depth + 1, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use tempfile::NamedTempFile;

    use super::*;

    fn document(html: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(html.as_bytes()).unwrap();
        file
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_serve_options() {
        let options = ServeOptions::parse(&args(&["page.html", "--url", "http://x.test/", "--offline"]))
            .unwrap();
        assert_eq!(
            options,
            ServeOptions {
                path: "page.html".into(),
                url: Some("http://x.test/".into()),
                offline: true,
            }
        );

        assert!(ServeOptions::parse(&args(&[])).is_err());
        assert!(ServeOptions::parse(&args(&["page.html", "--url"])).is_err());
        assert!(ServeOptions::parse(&args(&["page.html", "--verbose"])).is_err());
        assert!(ServeOptions::parse(&args(&["a.html", "b.html"])).is_err());
    }

    #[test]
    fn test_query_command() {
        let file = document(r#"<ul><li class="x">one</li><li>two</li><li class="x">three</li></ul>"#);
        let mut out = Vec::new();

        let count = query(file.path(), "li.x", &mut out).unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<li class=\"x\">one</li>\n<li class=\"x\">three</li>\n"
        );
    }

    #[test]
    fn test_query_invalid_selector() {
        let file = document("<p>hi</p>");
        let err = query(file.path(), "p[", &mut Vec::new()).unwrap_err();
        assert!(err.is_host());
    }

    #[test]
    fn test_tree_command() {
        let file = document("<html><head></head><body><form><input name=q></form></body></html>");
        let mut out = Vec::new();
        tree(file.path(), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<html>\n  <head>\n  <body>\n    <form>\n      <input name=\"q\">\n"
        );
    }

    #[test]
    fn test_missing_file() {
        let err = load_host(Path::new("/nonexistent/page.html")).unwrap_err();
        assert!(err.to_string().contains("reading /nonexistent/page.html"));
    }
}
