//! Platform shell strategy.

use super::{CommandKind, CommandSpec};
use crate::core::Platform;

/// Whether package-manager scripts are launched through a command shell.
///
/// On Windows the package manager's entry point is a `.cmd` script that
/// cannot be spawned directly; it must go through `cmd /C`. Binaries are
/// never wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellPolicy {
    /// Spawn every program directly.
    Direct,
    /// Wrap script commands in `cmd /C`.
    CommandShell,
}

impl ShellPolicy {
    /// Resolves the policy for a platform.
    #[must_use]
    pub fn for_platform(platform: Platform) -> Self {
        if platform.is_windows() {
            Self::CommandShell
        } else {
            Self::Direct
        }
    }

    /// Returns the program and arguments actually spawned for `spec`.
    #[must_use]
    pub fn invocation(self, spec: &CommandSpec) -> (String, Vec<String>) {
        match (self, spec.kind) {
            (Self::CommandShell, CommandKind::Script) => {
                let mut args = Vec::with_capacity(spec.args.len() + 2);
                args.push("/C".to_string());
                args.push(spec.program.clone());
                args.extend(spec.args.iter().cloned());
                ("cmd".to_string(), args)
            }
            _ => (spec.program.clone(), spec.args.clone()),
        }
    }
}

impl Default for ShellPolicy {
    fn default() -> Self {
        Self::for_platform(Platform::current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_for_platform() {
        assert_eq!(ShellPolicy::for_platform(Platform::Windows), ShellPolicy::CommandShell);
        assert_eq!(ShellPolicy::for_platform(Platform::Unix), ShellPolicy::Direct);
    }

    #[test]
    fn test_scripts_wrapped_under_command_shell() {
        let spec = CommandSpec::script("npm", "/repo").args(["run", "build"]);
        let (program, args) = ShellPolicy::CommandShell.invocation(&spec);

        assert_eq!(program, "cmd");
        assert_eq!(args, vec!["/C", "npm", "run", "build"]);
    }

    #[test]
    fn test_binaries_never_wrapped() {
        let spec = CommandSpec::new("gentype.native.exe", "/repo").arg("--version");
        let (program, args) = ShellPolicy::CommandShell.invocation(&spec);

        assert_eq!(program, "gentype.native.exe");
        assert_eq!(args, vec!["--version"]);
    }

    #[test]
    fn test_direct_leaves_scripts_alone() {
        let spec = CommandSpec::script("npm", "/repo").args(["run", "build"]);
        let (program, args) = ShellPolicy::Direct.invocation(&spec);

        assert_eq!(program, "npm");
        assert_eq!(args, vec!["run", "build"]);
    }
}
