use std::io::{Read, Write};
use std::path::PathBuf;

use clap::Parser;
use jsondata::{Activation, Throws, Value, format, json, path_iter};
use miette::{IntoDiagnostic, Result, WrapErr};
use tracing::debug;

/// jsondata - query and update JSON documents with path expressions
#[derive(Parser, Debug)]
#[command(name = "jsondata")]
#[command(about = "Query and update JSON documents with path expressions", long_about = None)]
struct Args {
    /// Path expression, e.g. `$.store.book[*].title` or `$..price`
    path: String,

    /// JSON file to read (if neither this nor --data is given, reads stdin)
    file: Option<PathBuf>,

    /// JSON document given inline
    #[arg(long, conflicts_with = "file")]
    data: Option<String>,

    /// Store this JSON value at every match and print the whole document
    #[arg(long, value_name = "JSON")]
    set: Option<String>,

    /// Create missing containers along the path
    #[arg(long)]
    vivify: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Print the concrete path of each match instead of its value
    #[arg(long, conflicts_with_all = ["set", "format"])]
    paths: bool,

    /// printf-style template per match; receives the path and the value
    /// (e.g. `%s = %J`)
    #[arg(long, value_name = "TEMPLATE", conflicts_with = "set")]
    format: Option<String>,
}

fn read_input(args: &Args) -> Result<String> {
    if let Some(data) = &args.data {
        return Ok(data.clone());
    }
    if let Some(file) = &args.file {
        return std::fs::read_to_string(file)
            .into_diagnostic()
            .wrap_err_with(|| format!("reading {}", file.display()));
    }
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .into_diagnostic()
        .wrap_err("reading stdin")?;
    Ok(text)
}

fn encode(cx: &mut Activation, value: &Value, pretty: bool) -> Throws<String> {
    let encoded = if pretty {
        json::encode_pretty(value)
    } else {
        json::encode(value)
    };
    encoded.map_err(|e| cx.throw(e.to_string()))
}

/// Run the query or update, returning the lines to print.
fn run(cx: &mut Activation, args: &Args, input: &str) -> Throws<Vec<String>> {
    let mut data = json::decode(input).map_err(|e| cx.throw(e.to_string()))?;
    let path = Value::from(args.path.as_str());

    if let Some(set) = &args.set {
        let value = json::decode(set).map_err(|e| cx.throw(e.to_string()))?;
        let mut iter = path_iter(cx, &mut data, &path, args.vivify)?;
        let mut written = 0;
        while let Some(mut found) = iter.next(cx)? {
            found.set(value.clone());
            written += 1;
        }
        debug!(path = %args.path, written, "updated document");
        return Ok(vec![encode(cx, &data, args.pretty)?]);
    }

    let mut lines = Vec::new();
    let mut iter = path_iter(cx, &mut data, &path, args.vivify)?;
    while let Some(found) = iter.next(cx)? {
        let line = if args.paths {
            found.path_text()
        } else if let Some(template) = &args.format {
            let fields = [Value::from(found.path_text()), found.value()];
            format::sprintf(template, &fields).map_err(|e| cx.throw(e.to_string()))?
        } else {
            encode(cx, &found.value(), args.pretty)?
        };
        lines.push(line);
    }
    debug!(path = %args.path, matches = lines.len(), "query finished");
    Ok(lines)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // Use RUST_LOG to control the log level, WARN if not set
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .into_diagnostic()?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let input = read_input(&args)?;

    // An exception nobody catches is reported by the activation stack, which
    // exits with status 1 before `scope` returns.
    let mut cx = Activation::new();
    let lines = match cx.scope(|cx| run(cx, &args, &input)) {
        Ok(lines) => lines,
        Err(_) => unreachable!("uncaught exceptions exit the process"),
    };

    let mut stdout = std::io::stdout().lock();
    for line in lines {
        writeln!(stdout, "{}", line).into_diagnostic()?;
    }
    Ok(())
}
