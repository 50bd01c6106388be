use owo_colors::{OwoColorize, Stream};
use tinyc::errors::{Diagnostic, DiagnosticMessage, Level};
use tinyc::source::Source;

fn format_level(level: Level) -> String {
    match level {
        Level::Bug => format!(
            "{}",
            "BUG  ".if_supports_color(Stream::Stderr, |text| text.red())
        ),

        Level::Error => format!(
            "{}",
            "ERROR".if_supports_color(Stream::Stderr, |text| text.bright_red())
        ),

        Level::Warn => format!(
            "{}",
            "WARN ".if_supports_color(Stream::Stderr, |text| text.yellow())
        ),

        Level::Info => format!(
            "{}",
            "INFO ".if_supports_color(Stream::Stderr, |text| text.bright_cyan())
        ),
    }
}

fn format_location(src: &Source<'_>, message: &DiagnosticMessage) -> String {
    let path = message
        .src
        .and_then(|id| src.get(id))
        .map(|file| file.path().display().to_string());

    match (path, message.span) {
        (Some(path), Some(span)) => format!("{}:{}: ", path, span.start),
        (Some(path), None) => format!("{}: ", path),
        (None, Some(span)) => format!("{}: ", span.start),
        (None, None) => "".to_owned(),
    }
}

/// Renders the source line the diagnostic points at with a caret under its start.
fn format_snippet(src: &Source<'_>, message: &DiagnosticMessage) -> Option<String> {
    let span = message.span?;
    let line = src.get(message.src?)?.line(span.start.line)?;
    let gutter = span.start.line.to_string();
    let caret = format!("{}^", " ".repeat(span.start.col.saturating_sub(1)));

    Some(format!(
        "{:>width$} | {}\n{:>width$} | {}",
        gutter,
        line,
        "",
        caret.if_supports_color(Stream::Stderr, |text| text.bright_red()),
        width = gutter.len(),
    ))
}

pub fn print_diagnostic(src: &Source<'_>, diagnostic: &Diagnostic) {
    let Diagnostic {
        level,
        message,
        source: _,
    } = diagnostic;

    let location = format_location(src, message);
    eprintln!("{} {}{}", format_level(*level), location, message);

    if let Some(snippet) = format_snippet(src, message) {
        eprintln!("{}", snippet);
    }
}
