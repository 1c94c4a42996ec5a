//! Resolution of the platform-appropriate update command.
//!
//! `nimbus` is installed in several different ways: npm or Yarn global
//! packages, a Homebrew formula, or a standalone binary dropped in place by
//! the installer script. The resolver inspects the running executable to
//! work out which install method is in play and renders the one command the
//! user should run to update, honoring the requested channel or pinned
//! release. It never performs the update itself.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context as _;
use thiserror::Error;

/// Version constraint requested for an update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VersionSpec {
    /// Follow a named release channel (e.g. `stable`, `canary`).
    Channel(String),
    /// Pin an exact version, overriding any channel.
    Release(String),
}

impl VersionSpec {
    /// The npm-style dist-tag or version for this spec.
    ///
    /// The stable channel is published under the `latest` dist-tag; other
    /// channels are published under their own name.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Channel(channel) if channel == "stable" => "latest",
            Self::Channel(channel) => channel,
            Self::Release(version) => version,
        }
    }

    /// Whether this spec asks for anything other than the stable channel.
    fn is_pinned(&self) -> bool {
        !matches!(self, Self::Channel(channel) if channel == "stable")
    }
}

/// What the update command hands to the resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolveRequest {
    /// Requested channel or pinned release.
    pub spec: VersionSpec,
    /// Skip the installer's confirmation prompt.
    pub assume_yes: bool,
}

/// How the running binary was installed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InstallMethod {
    Npm,
    Yarn,
    Homebrew,
    Binary,
}

#[derive(Debug, Error)]
enum ResolveError {
    #[error("could not locate the running executable")]
    NoExecutable(#[source] std::io::Error),
}

/// Resolve the update command for the current environment.
///
/// # Errors
///
/// Returns an error if the running executable cannot be located or its path
/// cannot be canonicalized, which makes install-method detection impossible.
pub async fn get_update_command(request: &ResolveRequest) -> anyhow::Result<String> {
    log::debug!("Locating the running executable...");
    let exe = std::env::current_exe().map_err(ResolveError::NoExecutable)?;

    // Resolve symlinks so a Homebrew opt/ link or an npm .bin shim is
    // attributed to its real install location.
    let exe = tokio::fs::canonicalize(&exe)
        .await
        .with_context(|| format!("could not canonicalize executable path {}", exe.display()))?;

    let method = detect_install_method(&exe);
    log::debug!(
        "Detected install method {method:?} from {path}",
        path = exe.display()
    );

    Ok(render_update_command(method, request))
}

/// Attribute the executable path to an install method.
///
/// Yarn is checked before npm since Yarn's global directory also contains a
/// `node_modules` segment.
fn detect_install_method(exe: &Path) -> InstallMethod {
    let has_segment = |name: &str| exe.components().any(|c| c.as_os_str() == name);

    if has_segment(".yarn") || has_segment("yarn") {
        InstallMethod::Yarn
    } else if has_segment("node_modules") {
        InstallMethod::Npm
    } else if has_segment("Cellar") || has_segment("homebrew") || has_segment(".linuxbrew") {
        InstallMethod::Homebrew
    } else {
        InstallMethod::Binary
    }
}

fn render_update_command(method: InstallMethod, request: &ResolveRequest) -> String {
    match method {
        InstallMethod::Npm => format!("npm install -g nimbus-cli@{}", request.spec.tag()),
        InstallMethod::Yarn => format!("yarn global add nimbus-cli@{}", request.spec.tag()),
        // brew only delivers the latest stable formula; channel and version
        // pins go through the installer script instead.
        InstallMethod::Homebrew if !request.spec.is_pinned() => "brew upgrade nimbus".to_string(),
        InstallMethod::Homebrew | InstallMethod::Binary => installer_script_command(request),
    }
}

/// Render the standalone installer invocation for the current platform.
fn installer_script_command(request: &ResolveRequest) -> String {
    if cfg!(windows) {
        // The PowerShell installer reads its constraints from the
        // environment rather than script arguments.
        let mut command = String::new();
        match &request.spec {
            VersionSpec::Channel(channel) if channel != "stable" => {
                let _ = write!(command, "$env:NIMBUS_CHANNEL='{channel}'; ");
            }
            VersionSpec::Release(version) => {
                let _ = write!(command, "$env:NIMBUS_VERSION='{version}'; ");
            }
            VersionSpec::Channel(_) => {}
        }
        command.push_str("irm https://nimbus.sh/install.ps1 | iex");
        command
    } else {
        let mut args: Vec<String> = Vec::new();
        match &request.spec {
            VersionSpec::Channel(channel) if channel != "stable" => {
                args.push(format!("--channel {channel}"));
            }
            VersionSpec::Release(version) => {
                args.push(format!("--release {version}"));
            }
            VersionSpec::Channel(_) => {}
        }
        if request.assume_yes {
            args.push("--yes".to_string());
        }

        if args.is_empty() {
            "curl -sSfL https://nimbus.sh/install.sh | sh".to_string()
        } else {
            format!(
                "curl -sSfL https://nimbus.sh/install.sh | sh -s -- {}",
                args.join(" ")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(spec: VersionSpec) -> ResolveRequest {
        ResolveRequest {
            spec,
            assume_yes: false,
        }
    }

    fn stable() -> VersionSpec {
        VersionSpec::Channel("stable".to_string())
    }

    fn canary() -> VersionSpec {
        VersionSpec::Channel("canary".to_string())
    }

    #[test]
    fn stable_channel_maps_to_latest_tag() {
        assert_eq!(stable().tag(), "latest");
    }

    #[test]
    fn other_channels_keep_their_name() {
        assert_eq!(canary().tag(), "canary");
    }

    #[test]
    fn release_tag_is_the_exact_version() {
        assert_eq!(VersionSpec::Release("1.2.3".to_string()).tag(), "1.2.3");
    }

    #[test]
    fn detects_npm_global_install() {
        let exe = Path::new("/usr/local/lib/node_modules/nimbus-cli/bin/nimbus");
        assert_eq!(detect_install_method(exe), InstallMethod::Npm);
    }

    #[test]
    fn detects_yarn_global_install() {
        let exe = Path::new("/home/user/.config/yarn/global/node_modules/.bin/nimbus");
        assert_eq!(detect_install_method(exe), InstallMethod::Yarn);
    }

    #[test]
    fn detects_homebrew_install() {
        let exe = Path::new("/opt/homebrew/Cellar/nimbus/0.3.1/bin/nimbus");
        assert_eq!(detect_install_method(exe), InstallMethod::Homebrew);
    }

    #[test]
    fn falls_back_to_standalone_binary() {
        let exe = Path::new("/usr/local/bin/nimbus");
        assert_eq!(detect_install_method(exe), InstallMethod::Binary);
    }

    #[test]
    fn npm_command_carries_the_tag() {
        let command = render_update_command(InstallMethod::Npm, &request(canary()));
        assert_eq!(command, "npm install -g nimbus-cli@canary");
    }

    #[test]
    fn yarn_command_carries_the_tag() {
        let command = render_update_command(InstallMethod::Yarn, &request(stable()));
        assert_eq!(command, "yarn global add nimbus-cli@latest");
    }

    #[test]
    fn homebrew_upgrades_stable_directly() {
        let command = render_update_command(InstallMethod::Homebrew, &request(stable()));
        assert_eq!(command, "brew upgrade nimbus");
    }

    #[cfg(not(windows))]
    #[test]
    fn homebrew_falls_back_to_installer_for_pinned_releases() {
        let command = render_update_command(
            InstallMethod::Homebrew,
            &request(VersionSpec::Release("1.2.3".to_string())),
        );
        assert_eq!(
            command,
            "curl -sSfL https://nimbus.sh/install.sh | sh -s -- --release 1.2.3"
        );
    }

    #[cfg(not(windows))]
    #[test]
    fn installer_script_is_bare_for_stable() {
        let command = render_update_command(InstallMethod::Binary, &request(stable()));
        assert_eq!(command, "curl -sSfL https://nimbus.sh/install.sh | sh");
    }

    #[cfg(not(windows))]
    #[test]
    fn installer_script_forwards_channel_and_yes() {
        let command = render_update_command(
            InstallMethod::Binary,
            &ResolveRequest {
                spec: canary(),
                assume_yes: true,
            },
        );
        assert_eq!(
            command,
            "curl -sSfL https://nimbus.sh/install.sh | sh -s -- --channel canary --yes"
        );
    }

    #[cfg(windows)]
    #[test]
    fn installer_script_uses_powershell_on_windows() {
        let command = render_update_command(InstallMethod::Binary, &request(canary()));
        assert_eq!(
            command,
            "$env:NIMBUS_CHANNEL='canary'; irm https://nimbus.sh/install.ps1 | iex"
        );
    }
}
