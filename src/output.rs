//! Terminal output writer shared by command handlers.

use console::style;

/// Options controlling how an [`Output`] behaves.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputOptions {
    /// Whether debug output is enabled.
    pub debug: bool,
}

/// Writer for user-facing command output.
pub struct Output {
    debug: bool,
}

impl Output {
    /// Create a new output writer from the given options.
    #[must_use]
    pub fn new(options: &OutputOptions) -> Self {
        Self {
            debug: options.debug,
        }
    }

    /// Whether this writer prints debug lines.
    #[must_use]
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Write a line of primary output to stdout.
    pub fn log(&self, message: &str) {
        println!("{message}");
    }

    /// Write a dimmed diagnostic line to stderr, only when debug output is
    /// enabled.
    pub fn debug(&self, message: &str) {
        if self.debug {
            eprintln!("{} {}", style("[debug]").dim(), style(message).dim());
        }
    }
}

/// Print a command error to stderr.
///
/// Argument-parse failures carry their own clap-rendered diagnostic
/// (including usage); every other error gets the standard red prefix. This
/// only does the user-facing formatting, the calling handler decides the
/// exit code.
pub fn handle_error(err: &anyhow::Error) {
    log::debug!("Handling command error: {err:?}");
    if let Some(parse_err) = err.downcast_ref::<clap::Error>() {
        eprint!("{}", parse_err.render().ansi());
    } else {
        eprintln!("{} {err:#}", style("> Error!").red().bold());
    }
}
