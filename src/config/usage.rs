//! Usage text for a record's declared fields.

use super::field::Schema;

const HELP_MESSAGE: &str = "This application is configured via the config file, \
environment variables, or command-line arguments.\n\
The following configurations can be used:\n\
[CONFIG FILE KEY, ENVIRONMENT VARIABLE, CLI ARGUMENT]";

const NOT_USED: &str = "<NOTUSED>";

/// Whether `-help` or `--help` appears among `args`.
pub fn help_requested(args: &[String]) -> bool {
    args.iter().any(|arg| arg == "-help" || arg == "--help")
}

/// Renders the help text listing every field's keys, type, default and
/// constraints.
pub fn render_usage<T>(program: &str, schema: &Schema<T>) -> String {
    let mut out = format!("Usage of {program}\n\n{HELP_MESSAGE}\n\n");

    for field in schema.fields() {
        out.push_str(&format!(
            "{}, {}, --{}:\n",
            field.file_key().unwrap_or(NOT_USED),
            field.env_name().unwrap_or(NOT_USED),
            field.arg_name()
        ));
        out.push_str(&format!("    description: {}\n", field.description()));
        out.push_str(&format!("    type:        {}\n", field.kind().label()));
        if let Some(default) = field.default_literal() {
            out.push_str(&format!("    default:     {default}\n"));
        }
        if field.is_required() {
            out.push_str("    required:    true\n");
        }
        let dependencies = field.dependencies();
        if !dependencies.is_empty() {
            out.push_str(&format!("    depends:     {}\n", dependencies.join(", ")));
        }
        out.push('\n');
    }

    out
}
