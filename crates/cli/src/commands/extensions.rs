use platon_core::{load_registry, BUILTIN_PLUGINS};

use crate::OutputFormat;

pub(crate) fn cmd_extensions(output: OutputFormat) {
    let registry = load_registry(&BUILTIN_PLUGINS);
    match output {
        OutputFormat::Json => {
            let listed: Vec<_> = registry
                .extensions()
                .map(|(ext, format)| serde_json::json!({ "extension": ext, "format": format }))
                .collect();
            let json = serde_json::to_string_pretty(&listed)
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            println!("{}", json);
        }
        OutputFormat::Text => {
            for (ext, format) in registry.extensions() {
                println!(".{}\t{}", ext, format);
            }
        }
    }
}
