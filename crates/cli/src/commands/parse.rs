use crate::commands::{fail, run_parser};
use crate::{OutputFormat, ParseArgs};

pub(crate) fn cmd_parse(args: &ParseArgs, output: OutputFormat, quiet: bool) {
    let document = match run_parser(args, output, quiet) {
        Ok(d) => d,
        Err(e) => fail(&e, output, quiet),
    };

    if output == OutputFormat::Text && !quiet {
        for warning in &document.warnings {
            eprintln!("warning: {}", warning);
        }
    }

    let pretty = serde_json::to_string_pretty(&document)
        .unwrap_or_else(|e| format!("serialization error: {}", e));
    println!("{}", pretty);
}
