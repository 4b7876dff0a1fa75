// src/pipeline/template.rs

//! Command templates for external tools.
//!
//! Placeholders:
//!
//! | placeholder | value                                   |
//! |-------------|-----------------------------------------|
//! | `{files}`   | every file, one invocation for the batch |
//! | `{file}`    | one file, one invocation per file       |
//! | `{name}`    | file name of `{file}` (`app.js`)        |
//! | `{stem}`    | file name without extension (`app`)     |
//! | `{src}`     | family source directory                 |
//! | `{dist}`    | family output directory                 |
//!
//! A template without `{files}`, `{file}`, `{name}` or `{stem}` gets the
//! files appended. Substituted values are shell-quoted. Anything else in
//! braces (e.g. `${HOME}`) is left untouched.

use std::borrow::Cow;
use std::path::Path;

use super::FileRecord;

const PER_FILE: [&str; 3] = ["file", "name", "stem"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    raw: String,
}

/// Directory values available to every template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateVars<'a> {
    pub src: &'a Path,
    pub dist: &'a Path,
}

impl CommandTemplate {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when the template runs once per file.
    pub fn is_per_file(&self) -> bool {
        PER_FILE.iter().any(|p| self.uses(p))
    }

    fn uses(&self, placeholder: &str) -> bool {
        self.raw.contains(&format!("{{{placeholder}}}"))
    }

    /// Expand into concrete shell commands. No files means no command.
    pub fn expand(&self, vars: TemplateVars<'_>, files: &[FileRecord]) -> Vec<String> {
        if files.is_empty() {
            return Vec::new();
        }

        let src = shell_quote(&vars.src.to_string_lossy()).into_owned();
        let dist = shell_quote(&vars.dist.to_string_lossy()).into_owned();

        if self.is_per_file() {
            return files
                .iter()
                .map(|file| {
                    let path = shell_quote(&file.path.to_string_lossy()).into_owned();
                    let name = file_part(&file.path, Path::file_name);
                    let stem = file_part(&file.path, Path::file_stem);
                    self.render(|key| match key {
                        "file" | "files" => Some(path.clone()),
                        "name" => Some(name.clone()),
                        "stem" => Some(stem.clone()),
                        "src" => Some(src.clone()),
                        "dist" => Some(dist.clone()),
                        _ => None,
                    })
                })
                .collect();
        }

        let joined = files
            .iter()
            .map(|f| shell_quote(&f.path.to_string_lossy()).into_owned())
            .collect::<Vec<_>>()
            .join(" ");

        let mut cmd = self.render(|key| match key {
            "files" => Some(joined.clone()),
            "src" => Some(src.clone()),
            "dist" => Some(dist.clone()),
            _ => None,
        });
        if !self.uses("files") {
            cmd.push(' ');
            cmd.push_str(&joined);
        }
        vec![cmd]
    }

    fn render(&self, lookup: impl Fn(&str) -> Option<String>) -> String {
        let mut out = String::with_capacity(self.raw.len());
        let mut rest = self.raw.as_str();

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let replaced = after.find('}').and_then(|close| {
                let key = &after[..close];
                lookup(key).map(|value| (value, close))
            });
            match replaced {
                Some((value, close)) => {
                    out.push_str(&value);
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

fn file_part(path: &Path, part: impl Fn(&Path) -> Option<&std::ffi::OsStr>) -> String {
    let value = part(path).map(|s| s.to_string_lossy()).unwrap_or_default();
    shell_quote(&value).into_owned()
}

/// Quote a value for `sh -c` (POSIX) or `cmd /C` (Windows).
pub fn shell_quote(value: &str) -> Cow<'_, str> {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if safe {
        return Cow::Borrowed(value);
    }
    if cfg!(windows) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Owned(format!("'{}'", value.replace('\'', r"'\''")))
    }
}
