use crate::error::{ErrorContext, ImageToolError, get_exit_code};

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Escape sequences for stderr, empty when the terminal takes no color.
struct Palette {
    error: &'static str,
    heading: &'static str,
    hint: &'static str,
    quiet: &'static str,
    reset: &'static str,
}

impl Palette {
    fn new(use_color: bool) -> Self {
        if use_color {
            Self {
                error: RED,
                heading: YELLOW,
                hint: CYAN,
                quiet: DIM,
                reset: RESET,
            }
        } else {
            Self {
                error: "",
                heading: "",
                hint: "",
                quiet: "",
                reset: "",
            }
        }
    }

    fn bold(&self) -> &'static str {
        if self.reset.is_empty() { "" } else { BOLD }
    }
}

pub fn format_error_chain(error: &ImageToolError) -> String {
    ErrorContext::new(error).to_string()
}

/// Render `error` for the terminal: the message, any lookup details, one
/// bullet per suggestion line and the exit code the process will use.
pub fn format_error_with_color(error: &ImageToolError, use_color: bool) -> String {
    let palette = Palette::new(use_color);
    let bold = palette.bold();
    let context = ErrorContext::new(error);

    let mut lines = vec![format!("{}{bold}Error:{} {error}", palette.error, palette.reset)];

    if let Some(details) = &context.details {
        lines.push(String::new());
        lines.push(details.clone());
    }

    if let Some(suggestion) = &context.suggestion {
        lines.push(String::new());
        lines.push(format!("{}{bold}Suggestions:{}", palette.heading, palette.reset));
        lines.extend(
            suggestion
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| format!("{}• {line}{}", palette.hint, palette.reset)),
        );
    }

    lines.push(String::new());
    lines.push(format!(
        "{}exit code {}{}",
        palette.quiet,
        get_exit_code(error),
        palette.reset
    ));

    let mut output = lines.join("\n");
    output.push('\n');
    output.push_str(palette.reset);
    output
}
