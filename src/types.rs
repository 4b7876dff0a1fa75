// src/types.rs

//! Small shared vocabulary: asset families, task kinds and task naming.

use std::fmt;

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Group of source files processed by the same set of tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetFamily {
    Styles,
    Scripts,
    Php,
}

impl AssetFamily {
    /// Families in the order their tasks appear inside composite aliases.
    pub const ALL: [AssetFamily; 3] = [AssetFamily::Styles, AssetFamily::Scripts, AssetFamily::Php];

    pub fn as_str(self) -> &'static str {
        match self {
            AssetFamily::Styles => "styles",
            AssetFamily::Scripts => "scripts",
            AssetFamily::Php => "php",
        }
    }

    /// Task kinds this family can provide.
    ///
    /// PHP sources are never compiled, so there is no `php-build`.
    pub fn supported_kinds(self) -> &'static [TaskKind] {
        match self {
            AssetFamily::Styles | AssetFamily::Scripts => {
                &[TaskKind::Build, TaskKind::Lint, TaskKind::Format]
            }
            AssetFamily::Php => &[TaskKind::Lint, TaskKind::Format],
        }
    }
}

impl fmt::Display for AssetFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a task does with its files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    Build,
    Lint,
    Format,
}

impl TaskKind {
    pub const ALL: [TaskKind; 3] = [TaskKind::Build, TaskKind::Lint, TaskKind::Format];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Build => "build",
            TaskKind::Lint => "lint",
            TaskKind::Format => "format",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of the task that runs `kind` for `family`, e.g. `styles-build`.
pub fn task_name(family: AssetFamily, kind: TaskKind) -> TaskName {
    format!("{}-{}", family.as_str(), kind.as_str())
}

/// Target name of the development server.
pub const SERVE_TARGET: &str = "serve";

/// Target run when no target is given on the command line.
pub const DEFAULT_TARGET: &str = "default";

/// Names reserved for built-in aliases.
pub const BUILTIN_ALIASES: [&str; 5] = ["build", "lint", "format", DEFAULT_TARGET, SERVE_TARGET];
