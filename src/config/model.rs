// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::types::{AssetFamily, TaskKind};

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [styles]
/// src = "src/styles"
/// dist = "dist/styles"
///
/// [scripts]
/// lint = { enabled = false }
///
/// [php]
///
/// [server]
/// cmd = "browser-sync start --proxy localhost"
/// reload_cmd = "browser-sync reload"
///
/// [alias]
/// ci = ["lint", "build"]
/// ```
///
/// Every family section is optional; a missing section means the family has
/// no tasks. Within a section every key has a documented default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub styles: Option<FamilyConfig>,

    #[serde(default)]
    pub scripts: Option<FamilyConfig>,

    #[serde(default)]
    pub php: Option<FamilyConfig>,

    /// Development server and watchers from `[server]`.
    #[serde(default)]
    pub server: Option<ServerConfig>,

    /// User aliases from `[alias]`: name -> targets run in order.
    #[serde(default)]
    pub alias: BTreeMap<String, Vec<String>>,
}

/// Validated configuration.
///
/// Only constructed through `TryFrom<RawConfigFile>` (see `validate.rs`), so
/// holders can rely on aliases being acyclic and all references resolving.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub styles: Option<FamilyConfig>,
    pub scripts: Option<FamilyConfig>,
    pub php: Option<FamilyConfig>,
    pub server: Option<ServerConfig>,
    pub alias: BTreeMap<String, Vec<String>>,

    /// Directory relative `src` / `dist` / `load_paths` are resolved against.
    /// The loader sets it to the config file's directory.
    pub root: PathBuf,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            styles: raw.styles,
            scripts: raw.scripts,
            php: raw.php,
            server: raw.server,
            alias: raw.alias,
            root: PathBuf::from("."),
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn family(&self, family: AssetFamily) -> Option<&FamilyConfig> {
        match family {
            AssetFamily::Styles => self.styles.as_ref(),
            AssetFamily::Scripts => self.scripts.as_ref(),
            AssetFamily::Php => self.php.as_ref(),
        }
    }

    /// Resolve a configured path against [`ConfigFile::root`].
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl RawConfigFile {
    pub fn family(&self, family: AssetFamily) -> Option<&FamilyConfig> {
        match family {
            AssetFamily::Styles => self.styles.as_ref(),
            AssetFamily::Scripts => self.scripts.as_ref(),
            AssetFamily::Php => self.php.as_ref(),
        }
    }
}

/// `[styles]`, `[scripts]` or `[php]` section.
///
/// | key          | styles          | scripts          | php           |
/// |--------------|-----------------|------------------|---------------|
/// | `src`        | `src/styles`    | `src/scripts`    | `src/php`     |
/// | `dist`       | `dist/styles`   | `dist/scripts`   | (= `src`)     |
/// | `glob`       | `**/*.scss`     | `**/*.js`        | `**/*.php`    |
/// | `extensions` | `["scss"]`      | n/a              | n/a           |
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FamilyConfig {
    #[serde(default)]
    pub src: Option<PathBuf>,

    #[serde(default)]
    pub dist: Option<PathBuf>,

    /// Glob selecting source files, relative to `src`.
    #[serde(default)]
    pub glob: Option<String>,

    /// Style extensions recognised by the import graph (styles only).
    #[serde(default)]
    pub extensions: Option<Vec<String>>,

    /// Extra import roots for the import graph (styles only).
    #[serde(default)]
    pub load_paths: Option<Vec<PathBuf>>,

    #[serde(default)]
    pub build: Option<ToolConfig>,

    #[serde(default)]
    pub lint: Option<ToolConfig>,

    #[serde(default)]
    pub format: Option<ToolConfig>,
}

impl FamilyConfig {
    pub fn src_dir(&self, family: AssetFamily) -> PathBuf {
        self.src
            .clone()
            .unwrap_or_else(|| PathBuf::from(default_src(family)))
    }

    pub fn dist_dir(&self, family: AssetFamily) -> PathBuf {
        match (&self.dist, family) {
            (Some(dist), _) => dist.clone(),
            // Formatting PHP rewrites sources in place.
            (None, AssetFamily::Php) => self.src_dir(family),
            (None, AssetFamily::Styles) => PathBuf::from("dist/styles"),
            (None, AssetFamily::Scripts) => PathBuf::from("dist/scripts"),
        }
    }

    pub fn glob(&self, family: AssetFamily) -> String {
        self.glob
            .clone()
            .unwrap_or_else(|| default_glob(family).to_string())
    }

    pub fn extensions(&self) -> Vec<String> {
        self.extensions
            .clone()
            .unwrap_or_else(|| vec!["scss".to_string()])
    }

    pub fn tool(&self, kind: TaskKind) -> Option<&ToolConfig> {
        match kind {
            TaskKind::Build => self.build.as_ref(),
            TaskKind::Lint => self.lint.as_ref(),
            TaskKind::Format => self.format.as_ref(),
        }
    }

    /// Whether the `<family>-<kind>` task exists.
    pub fn is_enabled(&self, family: AssetFamily, kind: TaskKind) -> bool {
        family.supported_kinds().contains(&kind)
            && self.tool(kind).is_none_or(|t| t.enabled)
    }

    /// Effective command template for a task, if the task exists.
    pub fn command(&self, family: AssetFamily, kind: TaskKind) -> Option<String> {
        if !self.is_enabled(family, kind) {
            return None;
        }
        let configured = self.tool(kind).and_then(|t| t.cmd.clone());
        configured.or_else(|| default_command(family, kind).map(str::to_string))
    }
}

/// Per-task tool settings, e.g. `lint = { cmd = "stylelint {files}" }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    /// Command template; falls back to the family default when omitted.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Set to false to drop the task entirely.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Long-lived live-reload server command (e.g. browser-sync).
    #[serde(default)]
    pub cmd: Option<String>,

    /// Command run after a watch-triggered rebuild of a rule with
    /// `reload = true`.
    #[serde(default)]
    pub reload_cmd: Option<String>,

    /// Targets run before the initial build + lint.
    #[serde(default)]
    pub before_serve: Vec<String>,

    /// Add one watcher per configured family (`<src>/<glob>`).
    #[serde(default = "default_true")]
    pub derive_watchers: bool,

    #[serde(default)]
    pub watchers: Vec<WatcherConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cmd: None,
            reload_cmd: None,
            before_serve: Vec::new(),
            derive_watchers: true,
            watchers: Vec::new(),
        }
    }
}

/// `[[server.watchers]]` entry.
///
/// `files` / `exclude` are globs relative to the config root.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatcherConfig {
    pub files: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,

    /// Targets (tasks or aliases) run when a matching file changes.
    #[serde(default)]
    pub tasks: Vec<String>,

    /// Run `server.reload_cmd` after the tasks.
    #[serde(default)]
    pub reload: bool,
}

fn default_true() -> bool {
    true
}

pub fn default_src(family: AssetFamily) -> &'static str {
    match family {
        AssetFamily::Styles => "src/styles",
        AssetFamily::Scripts => "src/scripts",
        AssetFamily::Php => "src/php",
    }
}

pub fn default_glob(family: AssetFamily) -> &'static str {
    match family {
        AssetFamily::Styles => "**/*.scss",
        AssetFamily::Scripts => "**/*.js",
        AssetFamily::Php => "**/*.php",
    }
}

/// Built-in command templates, see `pipeline::template` for placeholders.
pub fn default_command(family: AssetFamily, kind: TaskKind) -> Option<&'static str> {
    match (family, kind) {
        (AssetFamily::Styles, TaskKind::Build) => {
            Some("sass --style=compressed {file} {dist}/{stem}.css")
        }
        (AssetFamily::Styles, TaskKind::Lint) => Some("stylelint {files}"),
        (AssetFamily::Styles, TaskKind::Format) => Some("stylelint --fix {files}"),
        (AssetFamily::Scripts, TaskKind::Build) => Some(
            "uglifyjs {file} --compress drop_console=true --source-map --output {dist}/{name}",
        ),
        (AssetFamily::Scripts, TaskKind::Lint) => Some("eslint {files}"),
        (AssetFamily::Scripts, TaskKind::Format) => Some("eslint --fix {files}"),
        (AssetFamily::Php, TaskKind::Build) => None,
        (AssetFamily::Php, TaskKind::Lint) => {
            Some("phpcs --standard=PSR2 --warning-severity=1 --error-severity=1 {files}")
        }
        (AssetFamily::Php, TaskKind::Format) => Some("phpcbf --standard=PSR2 {files}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_family_section_uses_defaults() {
        let raw: RawConfigFile = toml::from_str("[styles]\n[php]\n").unwrap();
        let styles = raw.styles.as_ref().unwrap();

        assert_eq!(styles.src_dir(AssetFamily::Styles), PathBuf::from("src/styles"));
        assert_eq!(styles.glob(AssetFamily::Styles), "**/*.scss");
        assert_eq!(styles.extensions(), vec!["scss".to_string()]);
        assert_eq!(
            styles.command(AssetFamily::Styles, TaskKind::Lint).as_deref(),
            Some("stylelint {files}")
        );

        let php = raw.php.as_ref().unwrap();
        assert_eq!(php.dist_dir(AssetFamily::Php), PathBuf::from("src/php"));
        assert!(php.command(AssetFamily::Php, TaskKind::Build).is_none());
    }

    #[test]
    fn tool_overrides_and_disabling() {
        let raw: RawConfigFile = toml::from_str(
            r#"
[scripts]
src = "assets/js"
build = { cmd = "esbuild {files} --outdir={dist}" }
lint = { enabled = false }
"#,
        )
        .unwrap();
        let scripts = raw.scripts.as_ref().unwrap();

        assert_eq!(
            scripts.command(AssetFamily::Scripts, TaskKind::Build).as_deref(),
            Some("esbuild {files} --outdir={dist}")
        );
        assert!(!scripts.is_enabled(AssetFamily::Scripts, TaskKind::Lint));
        assert!(scripts.is_enabled(AssetFamily::Scripts, TaskKind::Format));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let res: Result<RawConfigFile, _> = toml::from_str("[styles]\nsrcs = 'x'\n");
        assert!(res.is_err());
    }

    #[test]
    fn server_defaults() {
        let raw: RawConfigFile = toml::from_str("[server]\n").unwrap();
        let server = raw.server.unwrap();
        assert!(server.derive_watchers);
        assert!(server.watchers.is_empty());
        assert!(server.cmd.is_none());
    }
}
