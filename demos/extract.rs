//! Runs one XPath query over a file (or stdin) and prints what it extracts.
//!
//! ```bash
//! cargo run --example extract -- page.html '//a/@href'
//! cargo run --example extract -- --xml --ns atom=http://www.w3.org/2005/Atom feed.xml '//atom:title/text()'
//! cat page.html | cargo run --example extract -- - '//title/text()' --re '\d+'
//! ```

use clap::Parser;
use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, Read};
use xsel::{ParseMode, ParseOptions, Response, Selector};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input file, or `-` for stdin
    input: String,

    /// XPath 1.0 expression, evaluated against the document root
    xpath: String,

    /// Parse as strict XML instead of HTML
    #[arg(long, default_value_t = false)]
    xml: bool,

    /// Namespace binding for the query, as `prefix=uri` (repeatable)
    #[arg(long = "ns", value_parser = parse_binding)]
    namespaces: Vec<(String, String)>,

    /// Regular expression applied to each result; a group named `extract` wins
    #[arg(long)]
    re: Option<String>,

    /// Print text nodes without markup escaping
    #[arg(long, default_value_t = false)]
    unquoted: bool,
}

fn parse_binding(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(prefix, uri)| (prefix.to_string(), uri.to_string()))
        .ok_or_else(|| format!("expected prefix=uri, got '{}'", raw))
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_LOG").is_err() {
        unsafe {
            env::set_var("RUST_LOG", "xsel=info");
        }
    }
    env_logger::init();

    let args = Args::parse();

    let body = if args.input == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        fs::read(&args.input)?
    };

    let mut options = ParseOptions::new().with_mode(if args.xml { ParseMode::Xml } else { ParseMode::Html });
    for (prefix, uri) in args.namespaces {
        options = options.with_namespace(prefix, uri);
    }

    let response = Response::new(body).with_url(args.input);
    let root = Selector::from_source_with_options(&response, &options)?;
    let results = root.query(&args.xpath)?;

    let lines = match (&args.re, args.unquoted) {
        (Some(pattern), _) => results.re(pattern.as_str())?,
        (None, true) => results.extract_unquoted(),
        (None, false) => results.extract(),
    };
    for line in &lines {
        println!("{}", line);
    }
    eprintln!("{} result(s) from {}", lines.len(), root);
    Ok(())
}
