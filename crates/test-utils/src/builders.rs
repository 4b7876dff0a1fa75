#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assetflow::config::{ConfigFile, FamilyConfig, RawConfigFile, ServerConfig, ToolConfig, WatcherConfig};
use assetflow::errors::Result;
use assetflow::types::{AssetFamily, TaskKind};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
    root: PathBuf,
}

impl ConfigFileBuilder {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            config: RawConfigFile::default(),
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn with_family(mut self, family: AssetFamily, cfg: FamilyConfig) -> Self {
        match family {
            AssetFamily::Styles => self.config.styles = Some(cfg),
            AssetFamily::Scripts => self.config.scripts = Some(cfg),
            AssetFamily::Php => self.config.php = Some(cfg),
        }
        self
    }

    pub fn with_alias(mut self, name: &str, members: &[&str]) -> Self {
        self.config
            .alias
            .insert(name.to_string(), members.iter().map(|m| m.to_string()).collect());
        self
    }

    pub fn with_server(mut self, server: ServerConfig) -> Self {
        self.config.server = Some(server);
        self
    }

    pub fn try_build(self) -> Result<ConfigFile> {
        Ok(ConfigFile::try_from(self.config)?.with_root(self.root))
    }

    pub fn build(self) -> ConfigFile {
        self.try_build().expect("Failed to build valid config from builder")
    }
}

/// Builder for a `[styles]` / `[scripts]` / `[php]` section.
#[derive(Default)]
pub struct FamilyConfigBuilder {
    family: FamilyConfig,
}

impl FamilyConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn src(mut self, src: &str) -> Self {
        self.family.src = Some(PathBuf::from(src));
        self
    }

    pub fn dist(mut self, dist: &str) -> Self {
        self.family.dist = Some(PathBuf::from(dist));
        self
    }

    pub fn glob(mut self, glob: &str) -> Self {
        self.family.glob = Some(glob.to_string());
        self
    }

    pub fn load_path(mut self, path: &str) -> Self {
        self.family
            .load_paths
            .get_or_insert_with(Vec::new)
            .push(PathBuf::from(path));
        self
    }

    pub fn cmd(mut self, kind: TaskKind, cmd: &str) -> Self {
        *self.tool_mut(kind) = Some(ToolConfig {
            cmd: Some(cmd.to_string()),
            enabled: true,
        });
        self
    }

    pub fn disable(mut self, kind: TaskKind) -> Self {
        *self.tool_mut(kind) = Some(ToolConfig {
            cmd: None,
            enabled: false,
        });
        self
    }

    fn tool_mut(&mut self, kind: TaskKind) -> &mut Option<ToolConfig> {
        match kind {
            TaskKind::Build => &mut self.family.build,
            TaskKind::Lint => &mut self.family.lint,
            TaskKind::Format => &mut self.family.format,
        }
    }

    pub fn build(self) -> FamilyConfig {
        self.family
    }
}

/// Shorthand for a `[[server.watchers]]` entry.
pub fn watcher(files: &[&str], tasks: &[&str], reload: bool) -> WatcherConfig {
    WatcherConfig {
        files: files.iter().map(|s| s.to_string()).collect(),
        exclude: Vec::new(),
        tasks: tasks.iter().map(|s| s.to_string()).collect(),
        reload,
    }
}
