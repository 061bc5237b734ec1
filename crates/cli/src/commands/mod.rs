pub(crate) mod check;
pub(crate) mod extensions;
pub(crate) mod parse;

use std::process;

use platon_core::{
    load_registry, FileSystemResolver, FullPath, ParseOptions, ParserContext, ParserError,
    ParserOutput, BUILTIN_PLUGINS,
};

use tracing::debug;

use crate::{report_error, OutputFormat, ParseArgs};

/// Read `args.file` from disk and parse it with the built-in registry.
///
/// Exits the process with status 1 if the file cannot be read.
pub(crate) fn run_parser(
    args: &ParseArgs,
    output: OutputFormat,
    quiet: bool,
) -> Result<ParserOutput, ParserError> {
    let bytes = match std::fs::read(&args.file) {
        Ok(b) => b,
        Err(e) => {
            let msg = format!("error reading file '{}': {}", args.file.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let path = FullPath::new(args.resource_id, args.file.to_string_lossy());
    debug!(path = %path, bytes = bytes.len(), max_depth = args.max_depth, "parsing");
    let options = ParseOptions::default().with_max_inheritance_depth(args.max_depth);
    let mut context = ParserContext::new(&bytes, path, args.circle_id, &FileSystemResolver)
        .with_options(options);
    if args.no_mandatory_keys {
        context = context.without_mandatory_keys();
    }
    load_registry(&BUILTIN_PLUGINS).run(context)
}

/// Print a parse error and exit with status 1.
pub(crate) fn fail(e: &ParserError, output: OutputFormat, quiet: bool) -> ! {
    match output {
        OutputFormat::Json => {
            let err_json = serde_json::to_string_pretty(&e.to_json_value())
                .unwrap_or_else(|_| format!("{{\"error\": \"{:?}\"}}", e));
            eprintln!("{}", err_json);
        }
        OutputFormat::Text => {
            if !quiet {
                eprintln!("error: {}", e);
            }
        }
    }
    process::exit(1);
}
