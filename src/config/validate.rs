// src/config/validate.rs

use std::collections::BTreeSet;

use globset::Glob;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{AssetflowError, Result};
use crate::types::{task_name, AssetFamily, TaskKind, BUILTIN_ALIASES, DEFAULT_TARGET, SERVE_TARGET};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::AssetflowError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

/// Run every semantic check on a freshly deserialized config.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_families(cfg)?;
    validate_families(cfg)?;
    validate_aliases(cfg)?;
    validate_alias_graph(cfg)?;
    validate_server(cfg)?;
    Ok(())
}

/// Names of every task the config will produce.
pub fn enabled_tasks(cfg: &RawConfigFile) -> BTreeSet<String> {
    let mut tasks = BTreeSet::new();
    for family in AssetFamily::ALL {
        if let Some(fc) = cfg.family(family) {
            for &kind in family.supported_kinds() {
                if fc.is_enabled(family, kind) {
                    tasks.insert(task_name(family, kind));
                }
            }
        }
    }
    tasks
}

fn ensure_has_families(cfg: &RawConfigFile) -> Result<()> {
    if AssetFamily::ALL.iter().all(|f| cfg.family(*f).is_none()) {
        return Err(AssetflowError::ConfigError(
            "config must contain at least one of [styles], [scripts] or [php]".to_string(),
        ));
    }
    Ok(())
}

fn validate_families(cfg: &RawConfigFile) -> Result<()> {
    for family in AssetFamily::ALL {
        let Some(fc) = cfg.family(family) else {
            continue;
        };

        if family != AssetFamily::Styles && (fc.extensions.is_some() || fc.load_paths.is_some()) {
            return Err(AssetflowError::ConfigError(format!(
                "[{family}] does not support `extensions` / `load_paths` (styles only)"
            )));
        }

        if let Some(exts) = &fc.extensions {
            if exts.is_empty() || exts.iter().any(|e| e.is_empty() || e.starts_with('.')) {
                return Err(AssetflowError::ConfigError(format!(
                    "[{family}].extensions must be non-empty names without a leading dot (got {exts:?})"
                )));
            }
        }

        let glob = fc.glob(family);
        check_glob(&glob, &format!("[{family}].glob"))?;

        for kind in TaskKind::ALL {
            let Some(tool) = fc.tool(kind) else {
                continue;
            };
            if !family.supported_kinds().contains(&kind) {
                return Err(AssetflowError::ConfigError(format!(
                    "[{family}] has no `{kind}` task"
                )));
            }
            if tool.cmd.as_deref().is_some_and(|c| c.trim().is_empty()) {
                return Err(AssetflowError::ConfigError(format!(
                    "[{family}].{kind}.cmd must not be empty"
                )));
            }
        }
    }
    Ok(())
}

fn validate_aliases(cfg: &RawConfigFile) -> Result<()> {
    let tasks = enabled_tasks(cfg);

    for (name, members) in cfg.alias.iter() {
        if BUILTIN_ALIASES.contains(&name.as_str()) || tasks.contains(name) {
            return Err(AssetflowError::ConfigError(format!(
                "alias '{name}' shadows a built-in task or alias"
            )));
        }
        if members.is_empty() {
            return Err(AssetflowError::ConfigError(format!(
                "alias '{name}' must list at least one target"
            )));
        }
        for member in members {
            check_runnable_target(cfg, &tasks, member, &format!("alias '{name}'"))?;
        }
    }
    Ok(())
}

/// Aliases may reference other aliases; reject cycles.
fn validate_alias_graph(cfg: &RawConfigFile) -> Result<()> {
    // Edge direction: alias -> member alias.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.alias.keys() {
        graph.add_node(name.as_str());
    }
    for (name, members) in cfg.alias.iter() {
        for member in members {
            if cfg.alias.contains_key(member) {
                graph.add_edge(name.as_str(), member.as_str(), ());
            }
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(AssetflowError::AliasCycle(format!(
            "cycle detected in aliases involving '{}'",
            cycle.node_id()
        ))),
    }
}

fn validate_server(cfg: &RawConfigFile) -> Result<()> {
    let Some(server) = &cfg.server else {
        return Ok(());
    };
    let tasks = enabled_tasks(cfg);

    for target in server.before_serve.iter() {
        check_runnable_target(cfg, &tasks, target, "[server].before_serve")?;
    }

    for (idx, watcher) in server.watchers.iter().enumerate() {
        let ctx = format!("[[server.watchers]] #{}", idx + 1);
        if watcher.files.is_empty() {
            return Err(AssetflowError::ConfigError(format!("{ctx} must list `files`")));
        }
        for pat in watcher.files.iter().chain(watcher.exclude.iter()) {
            check_glob(pat, &ctx)?;
        }
        for target in watcher.tasks.iter() {
            check_runnable_target(cfg, &tasks, target, &ctx)?;
        }
    }

    if server.cmd.as_deref().is_some_and(|c| c.trim().is_empty()) {
        return Err(AssetflowError::ConfigError(
            "[server].cmd must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// A target that can be nested inside an alias, `before_serve` or a watcher:
/// any task, user alias or `build` / `lint` / `format`. `serve` and
/// `default` are entry points only.
fn check_runnable_target(
    cfg: &RawConfigFile,
    tasks: &BTreeSet<String>,
    target: &str,
    ctx: &str,
) -> Result<()> {
    if target == SERVE_TARGET || target == DEFAULT_TARGET {
        return Err(AssetflowError::ConfigError(format!(
            "{ctx}: '{target}' can only be used as a top-level target"
        )));
    }
    let known = tasks.contains(target)
        || cfg.alias.contains_key(target)
        || BUILTIN_ALIASES.contains(&target);
    if !known {
        return Err(AssetflowError::ConfigError(format!(
            "{ctx} references unknown task '{target}'"
        )));
    }
    Ok(())
}

fn check_glob(pattern: &str, ctx: &str) -> Result<()> {
    Glob::new(pattern).map_err(|e| {
        AssetflowError::ConfigError(format!("{ctx}: invalid glob pattern '{pattern}': {e}"))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<ConfigFile> {
        let raw: RawConfigFile = toml::from_str(src)?;
        ConfigFile::try_from(raw)
    }

    #[test]
    fn empty_config_is_rejected() {
        let err = parse("").unwrap_err();
        assert!(matches!(err, AssetflowError::ConfigError(ref m) if m.contains("at least one")));
    }

    #[test]
    fn php_build_is_rejected() {
        let err = parse("[php]\nbuild = { cmd = 'x' }\n").unwrap_err();
        assert!(matches!(err, AssetflowError::ConfigError(ref m) if m.contains("no `build` task")));
    }

    #[test]
    fn extensions_only_for_styles() {
        assert!(parse("[scripts]\nextensions = ['ts']\n").is_err());
        assert!(parse("[styles]\nextensions = ['.scss']\n").is_err());
        assert!(parse("[styles]\nextensions = ['scss', 'sass']\n").is_ok());
    }

    #[test]
    fn invalid_glob_is_rejected() {
        let err = parse("[styles]\nglob = '**/[.scss'\n").unwrap_err();
        assert!(matches!(err, AssetflowError::ConfigError(ref m) if m.contains("invalid glob")));
    }

    #[test]
    fn alias_may_not_shadow_or_reference_unknown_targets() {
        assert!(parse("[styles]\n[alias]\nbuild = ['styles-lint']\n").is_err());
        assert!(parse("[styles]\n[alias]\nstyles-lint = ['build']\n").is_err());
        let err = parse("[styles]\n[alias]\nci = ['scripts-lint']\n").unwrap_err();
        assert!(matches!(err, AssetflowError::ConfigError(ref m) if m.contains("scripts-lint")));
    }

    #[test]
    fn disabled_tasks_are_unknown() {
        let err = parse("[styles]\nlint = { enabled = false }\n[alias]\nci = ['styles-lint']\n")
            .unwrap_err();
        assert!(matches!(err, AssetflowError::ConfigError(_)));
    }

    #[test]
    fn alias_cycles_are_rejected() {
        let err = parse("[styles]\n[alias]\na = ['b']\nb = ['c', 'lint']\nc = ['a']\n").unwrap_err();
        match err {
            AssetflowError::AliasCycle(msg) => assert!(msg.contains("cycle detected")),
            other => panic!("expected AliasCycle, got {other:?}"),
        }
    }

    #[test]
    fn serve_is_top_level_only() {
        let err = parse("[styles]\n[server]\nbefore_serve = ['serve']\n").unwrap_err();
        assert!(matches!(err, AssetflowError::ConfigError(ref m) if m.contains("top-level")));
        assert!(parse("[styles]\n[alias]\nx = ['default']\n").is_err());
    }

    #[test]
    fn watcher_targets_and_globs_are_checked() {
        assert!(parse("[styles]\n[server]\n[[server.watchers]]\nfiles = []\n").is_err());
        assert!(
            parse("[styles]\n[server]\n[[server.watchers]]\nfiles = ['**/*.twig']\ntasks = ['nope']\n")
                .is_err()
        );
        assert!(
            parse("[styles]\n[server]\n[[server.watchers]]\nfiles = ['**/*.twig']\ntasks = ['styles-build']\nreload = true\n")
                .is_ok()
        );
    }

    #[test]
    fn enabled_tasks_follow_family_sections() {
        let raw: RawConfigFile =
            toml::from_str("[styles]\nformat = { enabled = false }\n[php]\n").unwrap();
        let tasks: Vec<String> = enabled_tasks(&raw).into_iter().collect();
        assert_eq!(tasks, vec!["php-format", "php-lint", "styles-build", "styles-lint"]);
    }
}
