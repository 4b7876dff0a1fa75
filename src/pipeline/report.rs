// src/pipeline/report.rs

use super::FileRecord;

/// Render the "files updated" table logged after a task succeeds:
///
/// ```text
///        Asset  Size
///     main.css  1.2 KB
///    admin.css  830 B
/// ```
///
/// Returns `None` for an empty batch.
pub fn render_report(files: &[FileRecord]) -> Option<String> {
    let names: Vec<String> = files
        .iter()
        .map(|f| f.relative.to_string_lossy().replace('\\', "/"))
        .collect();
    let width = names.iter().map(|n| n.chars().count()).max()? + 1;

    let mut out = format!("{:>width$}  Size\n", "Asset");
    for (name, file) in names.iter().zip(files) {
        out.push_str(&format!("{name:>width$}  {}\n", format_size(file.len() as u64)));
    }
    Some(out)
}

/// Binary units, one decimal place above bytes.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{value:.1}");
    let trimmed = rounded.strip_suffix(".0").unwrap_or(&rounded);
    format!("{trimmed} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(830), "830 B");
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1229), "1.2 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5 MB");
    }

    #[test]
    fn table_is_right_aligned() {
        let files = vec![
            FileRecord::new("/d/main.css", "main.css", vec![0u8; 1229]),
            FileRecord::new("/d/a.css", "a.css", vec![0u8; 10]),
        ];
        let table = render_report(&files).unwrap();
        assert_eq!(
            table,
            "    Asset  Size\n main.css  1.2 KB\n    a.css  10 B\n"
        );
        assert!(render_report(&[]).is_none());
    }
}
