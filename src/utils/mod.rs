use std::path::Path;

/// Linux NAME_MAX, in bytes
pub const MAX_FILENAME_BYTES: usize = 255;

/// Format file size in human-readable format
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f = bytes as f64;
    let unit_index = (bytes_f.log10() / THRESHOLD.log10()).floor() as usize;
    let unit_index = unit_index.min(UNITS.len() - 1);

    let size = bytes_f / THRESHOLD.powi(unit_index as i32);

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

fn is_trimmed(c: char) -> bool {
    c.is_whitespace() || c == '.' || c == '_'
}

/// Cut `value` to at most `max` bytes without splitting a character
pub fn truncate_utf8(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

/// Sanitize filename for safe filesystem and URL usage.
///
/// Path separators and every other unsafe character become `_`, and leading or
/// trailing dots, underscores and whitespace are removed, so the result can never
/// name a parent directory or a hidden file. Applying it twice gives the same result.
pub fn sanitize_filename(filename: &str) -> String {
    let mapped: String = filename
        .chars()
        .map(|c| {
            match c {
                // Keep alphanumeric characters, spaces, hyphens, underscores, and dots
                c if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' || c == '.' => c,
                // Replace everything else with underscore
                _ => '_',
            }
        })
        .collect();

    let trimmed = mapped.trim_matches(is_trimmed);
    truncate_utf8(trimmed, MAX_FILENAME_BYTES)
        .trim_end_matches(is_trimmed)
        .to_string()
}

/// Sanitized name of the file at `path`, as echoed into download links
pub fn file_display_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    let sanitized = sanitize_filename(&name);
    (!sanitized.is_empty()).then_some(sanitized)
}

/// Check if the current environment has required tools
pub async fn check_dependencies(yt_dlp_path: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(yt_dlp_path).await {
        missing.push(format!("{} - required for stream extraction", yt_dlp_path));
    }

    missing
}

/// Check if a command is available in PATH
pub async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1024), "1.0 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1048576), "1.0 MB");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Hello World!"), "Hello World");
        assert_eq!(sanitize_filename("test/file?name"), "test_file_name");
        assert_eq!(sanitize_filename("  spaced  "), "spaced");
        assert_eq!(sanitize_filename("노래 제목.m4a"), "노래 제목.m4a");
    }

    #[test]
    fn strips_traversal_sequences() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_filename(".."), "");
        assert_eq!(sanitize_filename("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
    }

    #[test]
    fn sanitize_is_idempotent() {
        for input in ["../a b/..", "  x..  ", "clip\t(1080p).mp4", "___", "a/b\\c"] {
            let once = sanitize_filename(input);
            assert_eq!(sanitize_filename(&once), once, "input {:?}", input);
        }
    }

    #[test]
    fn limits_length_on_char_boundary() {
        let long = "가".repeat(200);
        let sanitized = sanitize_filename(&long);
        assert!(sanitized.len() <= MAX_FILENAME_BYTES);
        assert_eq!(sanitized.chars().count(), MAX_FILENAME_BYTES / 3);
    }

    #[test]
    fn display_name_of_path() {
        let path = PathBuf::from("audio").join("My Song.m4a");
        assert_eq!(file_display_name(&path).as_deref(), Some("My Song.m4a"));
        assert_eq!(file_display_name(Path::new("/")), None);
    }

    #[tokio::test]
    async fn missing_tool_is_reported() {
        let missing = check_dependencies("tubefetch-no-such-tool").await;
        assert_eq!(missing.len(), 1);
        assert!(missing[0].contains("tubefetch-no-such-tool"));
    }
}
