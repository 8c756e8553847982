/// Decodes a UTF-16 buffer filled by a Win32 `*W` call that returned `len` units.
pub fn from_wide(buf: &[u16], len: usize) -> String {
    String::from_utf16_lossy(&buf[..len.min(buf.len())])
}

pub fn ignore_case_equals(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.chars().zip(b.chars()).all(|(x, y)| {
        x == y || x.to_lowercase().eq(y.to_lowercase())
    })
}

/// Final path component of a full image path such as
/// `C:\Windows\explorer.exe`; accepts both separators.
pub fn file_name_of(path: &str) -> &str {
    path.rsplit(['\\', '/']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compares_ignoring_case() {
        assert!(ignore_case_equals("SearchUI.exe", "searchui.EXE"));
        assert!(!ignore_case_equals("SearchUI.exe", "SearchApp.exe"));
        assert!(!ignore_case_equals("explorer.exe", "explorer.ex"));
    }

    #[test]
    fn extracts_file_name_from_image_path() {
        assert_eq!(file_name_of(r"C:\Windows\explorer.exe"), "explorer.exe");
        assert_eq!(file_name_of("explorer.exe"), "explorer.exe");
        assert_eq!(file_name_of("/opt/app/bin/tool"), "tool");
    }

    #[test]
    fn decodes_partial_wide_buffer() {
        let buf: Vec<u16> = "Shell_TrayWnd\0\0\0".encode_utf16().collect();
        assert_eq!(from_wide(&buf, 13), "Shell_TrayWnd");
        assert_eq!(from_wide(&buf, 999).trim_end_matches('\0'), "Shell_TrayWnd");
    }
}
