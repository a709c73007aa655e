//! UI context for detecting interactive vs CI environments

use std::io::IsTerminal;

/// Variables set by common CI systems
const CI_VARS: [&str; 9] = [
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "TRAVIS",
    "JENKINS_URL",
    "BUILDKITE",
    "TEAMCITY_VERSION",
    "TF_BUILD",
];

/// UI context that determines diagnostic styling and prompt behavior
#[derive(Debug, Clone)]
pub struct UiContext {
    /// Whether stderr and stdin are both attached to a terminal
    interactive: bool,
    /// Whether --yes was passed
    auto_yes: bool,
}

impl UiContext {
    /// Detect the current environment
    pub fn detect() -> Self {
        Self {
            interactive: detect_interactive(),
            auto_yes: false,
        }
    }

    /// Create a non-interactive context (for testing or explicit CI mode)
    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            auto_yes: false,
        }
    }

    /// Set auto-yes mode (bypass prompts)
    pub fn with_auto_yes(mut self, yes: bool) -> Self {
        self.auto_yes = yes;
        self
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn auto_yes(&self) -> bool {
        self.auto_yes
    }

    /// Whether diagnostics may use cliclack styling
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }
}

// Stdout is deliberately not checked: `eval "$(shmgr load ...)"` captures it
// while the user still sits at a terminal.
fn detect_interactive() -> bool {
    if !std::io::stderr().is_terminal() || !std::io::stdin().is_terminal() {
        return false;
    }
    !CI_VARS.iter().any(|var| std::env::var_os(var).is_some())
}
