// src/graph/imports.rs

//! Extraction of `@import` / `@use` / `@forward` targets from SCSS source.
//!
//! This is deliberately not a full Sass parser: it strips comments, finds the
//! three module directives and reads their quoted targets. Anything the Sass
//! compiler would treat as a plain CSS import is dropped here because it never
//! creates a dependency on another source file.

use std::sync::LazyLock;

use regex::Regex;

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(import|use|forward)\b").expect("directive regex is valid")
});

/// One import target as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRef {
    pub target: String,
    /// 1-based line of the directive.
    pub line: usize,
}

/// Syntax problem found while extracting imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSyntaxError {
    pub line: usize,
    pub message: String,
}

/// Extract every file-level import target from `source`, in source order.
pub fn extract_imports(source: &str) -> Result<Vec<ImportRef>, ImportSyntaxError> {
    let Scrubbed { code, mask } = scrub(source)?;
    let mut imports = Vec::new();
    let mut line = 1;
    let mut counted = 0;

    // Directives are searched in `mask`, where string bodies are blanked, so
    // `content: "@import"` is not one. Offsets are shared with `code`.
    for caps in DIRECTIVE.captures_iter(&mask) {
        let whole = caps.get(0).expect("group 0 always matches");
        let directive = &caps[1];
        line += code[counted..whole.start()].matches('\n').count();
        counted = whole.start();
        let rest = &code[whole.end()..];

        let targets = parse_targets(directive, rest, line)?;
        imports.extend(
            targets
                .into_iter()
                .filter(|t| !is_plain_css(t) && !is_builtin_module(t))
                .map(|target| ImportRef { target, line }),
        );
    }

    Ok(imports)
}

/// Read the quoted targets that follow a directive keyword.
///
/// `@import` accepts a comma separated list; `@use` and `@forward` take one
/// target followed by optional `as` / `with` / `show` clauses we ignore.
fn parse_targets(
    directive: &str,
    rest: &str,
    line: usize,
) -> Result<Vec<String>, ImportSyntaxError> {
    let mut targets = Vec::new();
    let mut chars = rest.char_indices().peekable();

    loop {
        while chars.peek().is_some_and(|(_, c)| c.is_whitespace()) {
            chars.next();
        }

        match chars.peek().copied() {
            Some((_, quote @ ('"' | '\''))) => {
                chars.next();
                let mut target = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '\\' => {
                            if let Some((_, escaped)) = chars.next() {
                                target.push(escaped);
                            }
                        }
                        '\n' => break,
                        c if c == quote => {
                            closed = true;
                            break;
                        }
                        c => target.push(c),
                    }
                }
                if !closed {
                    return Err(ImportSyntaxError {
                        line,
                        message: format!("unterminated string in @{directive}"),
                    });
                }
                targets.push(target);
            }
            Some((idx, _)) if directive == "import" && rest[idx..].starts_with("url(") => {
                // Plain CSS import; skip past the closing paren.
                for (_, c) in chars.by_ref() {
                    if c == ')' {
                        break;
                    }
                }
            }
            _ => {
                return Err(ImportSyntaxError {
                    line,
                    message: format!("expected a quoted target after @{directive}"),
                });
            }
        }

        if directive != "import" {
            break;
        }

        while chars.peek().is_some_and(|(_, c)| c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_some_and(|(_, c)| *c == ',') {
            chars.next();
            continue;
        }
        break;
    }

    Ok(targets)
}

/// Source with comments blanked (`code`), plus the same text with string
/// contents blanked as well (`mask`). Both keep the byte offsets and
/// newlines of the input.
struct Scrubbed {
    code: String,
    mask: String,
}

impl Scrubbed {
    fn with_capacity(len: usize) -> Self {
        Self {
            code: String::with_capacity(len),
            mask: String::with_capacity(len),
        }
    }

    fn keep(&mut self, c: char) {
        self.code.push(c);
        self.mask.push(c);
    }

    fn string_body(&mut self, c: char) {
        self.code.push(c);
        blank(&mut self.mask, c);
    }

    fn comment(&mut self, c: char) {
        blank(&mut self.code, c);
        blank(&mut self.mask, c);
    }
}

fn blank(out: &mut String, c: char) {
    if c == '\n' {
        out.push('\n');
    } else {
        out.extend(std::iter::repeat_n(' ', c.len_utf8()));
    }
}

fn scrub(source: &str) -> Result<Scrubbed, ImportSyntaxError> {
    let mut out = Scrubbed::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut line = 1;
    let mut in_string: Option<char> = None;

    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
            // Sass strings cannot span lines unescaped.
            in_string = None;
            out.keep(c);
            continue;
        }

        if let Some(quote) = in_string {
            if c == quote {
                in_string = None;
                out.keep(c);
                continue;
            }
            out.string_body(c);
            if c == '\\' {
                if let Some(&next) = chars.peek() {
                    if next != '\n' {
                        out.string_body(next);
                        chars.next();
                    }
                }
            }
            continue;
        }

        match (c, chars.peek().copied()) {
            ('"' | '\'', _) => {
                in_string = Some(c);
                out.keep(c);
            }
            ('/', Some('/')) => {
                out.comment(c);
                while let Some(n) = chars.next_if(|&n| n != '\n') {
                    out.comment(n);
                }
            }
            ('/', Some('*')) => {
                let start_line = line;
                out.comment(c);
                out.comment('*');
                chars.next();
                let mut closed = false;
                while let Some(n) = chars.next() {
                    if n == '*' && chars.peek() == Some(&'/') {
                        chars.next();
                        out.comment('*');
                        out.comment('/');
                        closed = true;
                        break;
                    }
                    if n == '\n' {
                        line += 1;
                    }
                    out.comment(n);
                }
                if !closed {
                    return Err(ImportSyntaxError {
                        line: start_line,
                        message: "unterminated block comment".to_string(),
                    });
                }
            }
            _ => out.keep(c),
        }
    }

    Ok(out)
}

fn is_plain_css(target: &str) -> bool {
    target.ends_with(".css")
        || target.starts_with("http://")
        || target.starts_with("https://")
        || target.starts_with("//")
}

fn is_builtin_module(target: &str) -> bool {
    target.starts_with("sass:")
}
