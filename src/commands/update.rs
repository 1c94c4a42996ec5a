//! Update command handler.
//!
//! Resolves and prints the command the user should run to update the CLI
//! for their platform, install method, and requested release channel or
//! pinned version. The handler owns its argument parsing and help rendering
//! so it can keep the documented exit-code contract: `0` on success, `1` on
//! an argument failure, `2` when help was shown.

use std::future::Future;

use clap::{Arg, ArgAction};
use console::style;

use crate::output::{self, Output, OutputOptions};
use crate::update::{self, ResolveRequest, VersionSpec};

/// Exit code after successfully printing the update instruction.
pub const EXIT_OK: u8 = 0;
/// Exit code for an argument-parsing failure.
pub const EXIT_BAD_ARGS: u8 = 1;
/// Exit code when help was displayed.
pub const EXIT_HELP: u8 = 2;

/// Parsed `update` flags.
#[derive(Clone, Debug, PartialEq, Eq)]
struct UpdateArgs {
    help: bool,
    debug: bool,
    channel: String,
    release: Option<String>,
    yes: bool,
}

impl UpdateArgs {
    fn output_options(&self) -> OutputOptions {
        OutputOptions { debug: self.debug }
    }

    /// The constraint handed to the resolver; `--release` overrides
    /// `--channel` when both are supplied.
    fn resolve_request(&self) -> ResolveRequest {
        let spec = match &self.release {
            Some(version) => VersionSpec::Release(version.clone()),
            None => VersionSpec::Channel(self.channel.clone()),
        };
        ResolveRequest {
            spec,
            assume_yes: self.yes,
        }
    }
}

/// The recognized-flag table for this subcommand.
///
/// clap's built-in help flag is disabled so a help request flows through
/// the parsed arguments and gets this command's own help text and exit
/// code.
fn command() -> clap::Command {
    clap::Command::new("nimbus update")
        .no_binary_name(true)
        .disable_help_flag(true)
        .arg(
            Arg::new("help")
                .short('h')
                .long("help")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("channel")
                .short('c')
                .long("channel")
                .value_name("NAME")
                .default_value("stable"),
        )
        .arg(
            Arg::new("release")
                .short('r')
                .long("release")
                .value_name("VERSION"),
        )
        .arg(
            Arg::new("yes")
                .short('y')
                .long("yes")
                .action(ArgAction::SetTrue),
        )
}

fn parse_args(args: &[String]) -> Result<UpdateArgs, clap::Error> {
    let matches = command().try_get_matches_from(args)?;
    Ok(UpdateArgs {
        help: matches.get_flag("help"),
        debug: matches.get_flag("debug"),
        channel: matches
            .get_one::<String>("channel")
            .expect("channel has a default")
            .clone(),
        release: matches.get_one::<String>("release").cloned(),
        yes: matches.get_flag("yes"),
    })
}

fn help() {
    println!(
        "
  {title} [options]

  {options}

    -h, --help                     Output usage information
    -d, --debug                    Debug mode [off]
    -c {name}, --channel={name}        Specify which release channel to install [stable]
    -r {version}, --release={version}  Specific version to install (overrides `--channel`)
    -y, --yes                      Skip the confirmation prompt

  {examples}

  {dash} Update Nimbus CLI to the latest canary version

      {example}
",
        title = style("nimbus update").bold(),
        options = style("Options:").dim(),
        name = style("NAME").bold().underlined(),
        version = style("VERSION").bold().underlined(),
        examples = style("Examples:").dim(),
        dash = style("–").dim(),
        example = style("$ nimbus update --channel=canary").cyan(),
    );
}

/// Run the update command over the raw subcommand arguments.
///
/// Returns the process exit code: [`EXIT_OK`] after printing the update
/// instruction, [`EXIT_BAD_ARGS`] on an argument-parsing failure (reported
/// through the shared error handler), [`EXIT_HELP`] when help was shown.
///
/// # Errors
///
/// Returns an error only when update-command resolution fails; that is left
/// to the top-level dispatcher to surface.
pub async fn run(args: &[String]) -> anyhow::Result<u8> {
    run_with(args, |request| async move {
        update::get_update_command(&request).await
    })
    .await
}

/// [`run`] against an arbitrary resolver, so tests can observe what gets
/// resolved (and whether resolution happens at all).
async fn run_with<R, Fut>(args: &[String], resolve: R) -> anyhow::Result<u8>
where
    R: FnOnce(ResolveRequest) -> Fut,
    Fut: Future<Output = anyhow::Result<String>>,
{
    log::debug!("Parsing update arguments: {args:?}");
    let argv = match parse_args(args) {
        Ok(argv) => argv,
        Err(err) => {
            output::handle_error(&anyhow::Error::new(err));
            return Ok(EXIT_BAD_ARGS);
        }
    };
    log::trace!("Parsed update arguments: {argv:?}");

    // Help wins over every other flag, and short-circuits resolution.
    if argv.help {
        help();
        return Ok(EXIT_HELP);
    }

    let output = Output::new(&argv.output_options());
    let request = argv.resolve_request();
    output.debug(&format!("Resolving update command for {:?}", request.spec));

    let instruction = resolve(request).await?;
    output.log(&instruction);
    Ok(EXIT_OK)
}
