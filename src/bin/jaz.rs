#![allow(clippy::print_stderr, clippy::print_stdout)]

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;

use jaz::cli::args::CliArgs;
use jaz::cli::{driver, reporter::Reporter};

const EXIT_SUCCESS: i32 = 0;
const EXIT_DIAGNOSTICS: i32 = 1;

fn main() -> Result<()> {
    // Initialize tracing if JAZ_LOG or RUST_LOG is set (zero cost
    // otherwise). Supports JAZ_LOG_FORMAT=tree|json|text.
    jaz::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let result = driver::run(&args)?;

    let color = !args.no_color && std::io::stderr().is_terminal();
    let mut reporter = Reporter::new(color);
    for (file, text) in &result.sources {
        reporter.add_source(file, text);
    }
    if !result.diagnostics.is_empty() {
        eprintln!("{}", reporter.render(&result.diagnostics));
    }

    for (file, text) in &result.emitted_sources {
        println!("// {file}");
        print!("{text}");
    }
    if !result.declaration_dumps.is_empty() {
        let dumps: serde_json::Map<String, serde_json::Value> = result
            .declaration_dumps
            .iter()
            .map(|(file, decls)| {
                (
                    file.clone(),
                    serde_json::to_value(decls).unwrap_or(serde_json::Value::Null),
                )
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&dumps)?);
    }

    let status = if result.error_count() > 0 {
        EXIT_DIAGNOSTICS
    } else {
        EXIT_SUCCESS
    };
    std::process::exit(status);
}
