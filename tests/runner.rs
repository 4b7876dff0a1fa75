mod common;

use std::path::Path;
use std::sync::Arc;

use assetflow::config::ConfigFile;
use assetflow::engine::{RunOptions, Runner};
use assetflow::errors::AssetflowError;
use assetflow::fs::{FileSystem, RealFileSystem};
use assetflow::pipeline::DiffFilter;
use assetflow::tasks::TaskRegistry;
use assetflow::types::{AssetFamily, TaskKind};
use common::{init_tracing, write_file, ConfigFileBuilder, FakeBackend, FamilyConfigBuilder, TestResult};
use tempfile::{tempdir, TempDir};

fn styles_project() -> (TempDir, ConfigFile) {
    let dir = tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    write_file(&root, "src/styles/_base.scss", "$gap: 1rem;\n");
    write_file(&root, "src/styles/_mixins.scss", "@import 'base';\n");
    write_file(&root, "src/styles/main.scss", "@import 'mixins';\n");
    write_file(&root, "src/styles/admin.scss", "@import 'mixins';\n");
    write_file(&root, "src/scripts/app.js", "console.log(1);\n");

    let cfg = ConfigFileBuilder::new(&root)
        .with_family(
            AssetFamily::Styles,
            FamilyConfigBuilder::new()
                .dist("public/css")
                .cmd(TaskKind::Build, "sass {file} {dist}/{stem}.css")
                .cmd(TaskKind::Lint, "stylelint {files}")
                .disable(TaskKind::Format)
                .build(),
        )
        .with_family(
            AssetFamily::Scripts,
            FamilyConfigBuilder::new()
                .cmd(TaskKind::Build, "uglifyjs {file} --output {dist}/{name}")
                .cmd(TaskKind::Lint, "eslint {files}")
                .disable(TaskKind::Format)
                .build(),
        )
        .with_alias("ci", &["lint", "scripts-build"])
        .build();
    (dir, cfg)
}

fn runner_for(cfg: &ConfigFile, backend: FakeBackend) -> Runner<FakeBackend> {
    let registry = Arc::new(TaskRegistry::from_config(cfg));
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    Runner::new(registry, backend, fs)
}

fn compiled_entries(backend: &FakeBackend) -> Vec<String> {
    let mut names: Vec<String> = backend
        .invocations()
        .into_iter()
        .filter(|i| i.task == "styles-build")
        .filter_map(|i| {
            let out = i.command.rsplit('/').next()?.to_string();
            Some(out.trim_end_matches('\'').to_string())
        })
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn unchanged_files_are_not_handed_to_tools_again() -> TestResult {
    init_tracing();
    let (dir, cfg) = styles_project();
    let backend = FakeBackend::new();
    let runner = runner_for(&cfg, backend.clone());

    let first = runner.run_task("styles-build").await?;
    assert_eq!(first.invocations, 2);
    assert_eq!(compiled_entries(&backend), vec!["admin.css", "main.css"]);

    backend.clear();
    let second = runner.run_task("styles-build").await?;
    assert_eq!(second.invocations, 0);
    assert!(second.files.is_empty());
    assert!(backend.invocations().is_empty());

    // A partial change recompiles only the entry files that import it.
    write_file(dir.path(), "src/styles/_base.scss", "$gap: 2rem;\n");
    let third = runner.run_task("styles-build").await?;
    assert_eq!(third.invocations, 2);
    assert_eq!(compiled_entries(&backend), vec!["admin.css", "main.css"]);
    Ok(())
}

#[tokio::test]
async fn changed_entry_file_only_recompiles_itself() -> TestResult {
    let (dir, cfg) = styles_project();
    let backend = FakeBackend::new();
    let runner = runner_for(&cfg, backend.clone());
    runner.run_task("styles-build").await?;
    backend.clear();

    write_file(dir.path(), "src/styles/admin.scss", "@import 'mixins';\nb { x: y; }\n");
    runner.run_task("styles-build").await?;
    assert_eq!(compiled_entries(&backend), vec!["admin.css"]);
    Ok(())
}

#[tokio::test]
async fn dist_and_file_placeholders_expand_to_absolute_paths() -> TestResult {
    let (dir, cfg) = styles_project();
    let backend = FakeBackend::new();
    let runner = runner_for(&cfg, backend.clone());
    runner.run_task("scripts-build").await?;

    let root = dir.path().canonicalize()?;
    let invocations = backend.invocations();
    assert_eq!(invocations.len(), 1);
    let inv = &invocations[0];
    assert_eq!(inv.cwd, root);
    assert!(inv.command.starts_with("uglifyjs "));
    assert!(inv.command.contains("src/scripts/app.js"));
    let dist = root.join("dist/scripts");
    assert!(
        inv.command.contains(&format!("--output {}/app.js", dist.display()))
            || inv.command.contains(&format!("--output '{}'/app.js", dist.display())),
        "unexpected command: {}",
        inv.command
    );
    assert!(inv.command.ends_with("/app.js"));
    Ok(())
}

#[tokio::test]
async fn lint_failures_warn_unless_fail_after_error() -> TestResult {
    let (_dir, cfg) = styles_project();

    let backend = FakeBackend::new();
    backend.fail_task("styles-lint", 2);
    let runner = runner_for(&cfg, backend.clone());
    let reports = runner.run_target("lint").await?;
    let styles = reports.iter().find(|r| r.task == "styles-lint").unwrap();
    assert_eq!(styles.failed, Some(2));
    // Scripts lint still ran after the styles failure.
    assert!(backend.tasks().contains(&"scripts-lint".to_string()));

    let strict_backend = FakeBackend::new();
    strict_backend.fail_task("styles-lint", 2);
    let strict = runner_for(&cfg, strict_backend.clone()).with_options(RunOptions {
        fail_after_error: true,
    });
    let err = strict.run_target("lint").await.unwrap_err();
    assert!(matches!(err, AssetflowError::TaskFailed { ref task, code: 2 } if task == "styles-lint"));
    assert!(!strict_backend.tasks().contains(&"scripts-lint".to_string()));
    Ok(())
}

#[tokio::test]
async fn build_failures_always_stop_the_run() -> TestResult {
    let (_dir, cfg) = styles_project();
    let backend = FakeBackend::new();
    backend.fail_task("styles-build", 1);
    let runner = runner_for(&cfg, backend.clone());

    let err = runner.run_target("build").await.unwrap_err();
    assert!(matches!(err, AssetflowError::TaskFailed { code: 1, .. }));
    assert!(!backend.tasks().contains(&"scripts-build".to_string()));
    Ok(())
}

#[tokio::test]
async fn aliases_and_default_target_expand_in_order() -> TestResult {
    let (_dir, cfg) = styles_project();
    let backend = FakeBackend::new();
    let runner = runner_for(&cfg, backend.clone());

    let reports = runner.run_target("ci").await?;
    let tasks: Vec<&str> = reports.iter().map(|r| r.task.as_str()).collect();
    assert_eq!(tasks, vec!["styles-lint", "scripts-lint", "scripts-build"]);

    let reports = runner.run_target("default").await?;
    let tasks: Vec<&str> = reports.iter().map(|r| r.task.as_str()).collect();
    assert_eq!(
        tasks,
        vec!["styles-build", "scripts-build", "styles-lint", "scripts-lint"]
    );

    assert!(matches!(
        runner.run_target("nope").await,
        Err(AssetflowError::TaskNotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn diff_filter_limits_files_to_modified_ones() -> TestResult {
    let (dir, cfg) = styles_project();
    let root = dir.path().canonicalize()?;
    let diff = DiffFilter::from_output(&RealFileSystem, &root, "src/styles/main.scss\nREADME.md\n");

    let backend = FakeBackend::new();
    let runner = runner_for(&cfg, backend.clone()).with_diff_filter(diff);

    let report = runner.run_task("styles-build").await?;
    assert_eq!(report.invocations, 1);
    assert_eq!(compiled_entries(&backend), vec!["main.css"]);

    let report = runner.run_task("scripts-lint").await?;
    assert_eq!(report.invocations, 0);
    Ok(())
}

#[tokio::test]
async fn modified_partial_in_diff_rebuilds_its_entry_files() -> TestResult {
    let (dir, cfg) = styles_project();
    let root = dir.path().canonicalize()?;
    let diff = DiffFilter::from_output(&RealFileSystem, &root, "src/styles/_base.scss\n");

    let backend = FakeBackend::new();
    let runner = runner_for(&cfg, backend.clone()).with_diff_filter(diff);

    let report = runner.run_task("styles-build").await?;
    assert_eq!(report.invocations, 2);
    assert_eq!(compiled_entries(&backend), vec!["admin.css", "main.css"]);
    Ok(())
}

#[tokio::test]
async fn missing_source_directory_runs_nothing() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path().canonicalize()?;
    let cfg = ConfigFileBuilder::new(&root)
        .with_family(
            AssetFamily::Php,
            FamilyConfigBuilder::new().src("does/not/exist").build(),
        )
        .build();
    let backend = FakeBackend::new();
    let runner = runner_for(&cfg, backend.clone());

    let report = runner.run_task("php-lint").await?;
    assert_eq!(report.invocations, 0);
    assert!(backend.invocations().is_empty());
    assert!(!Path::new(&root.join("does")).exists());
    Ok(())
}
