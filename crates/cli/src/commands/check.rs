use serde::Serialize;

use crate::commands::{fail, run_parser};
use crate::{OutputFormat, ParseArgs};

#[derive(Serialize)]
struct CheckSummary<'a> {
    ok: bool,
    file: String,
    format: &'a str,
    keys: usize,
    dependencies: usize,
    warnings: &'a [String],
}

pub(crate) fn cmd_check(args: &ParseArgs, output: OutputFormat, quiet: bool) {
    let document = match run_parser(args, output, quiet) {
        Ok(d) => d,
        Err(e) => fail(&e, output, quiet),
    };

    let summary = CheckSummary {
        ok: true,
        file: document.path.to_string(),
        format: &document.format,
        keys: document.data.len(),
        dependencies: document.dependencies.len(),
        warnings: &document.warnings,
    };

    match output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            println!("{}", json);
        }
        OutputFormat::Text => {
            if quiet {
                return;
            }
            println!(
                "ok: {} ({} top-level keys, {} dependencies)",
                args.file.display(),
                summary.keys,
                summary.dependencies
            );
            for warning in summary.warnings {
                println!("  warning: {}", warning);
            }
        }
    }
}
