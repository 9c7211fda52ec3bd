//! Reads the message-of-the-day file once at startup.

use std::fs;
use std::io;
use std::path::Path;

/// Returns the MOTD split into lines (CR stripped), or `None` if the file does not exist or
/// cannot be read — the caller sends `ERR_NOMOTD` in that case rather than failing startup.
pub fn load<P: AsRef<Path>>(path: P) -> Option<Vec<String>> {
    match fs::read_to_string(&path) {
        Ok(contents) => Some(contents.lines().map(str::to_owned).collect()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => None,
        Err(err) => {
            log::warn!("failed to read motd file {}: {err}", path.as_ref().display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_returns_none() {
        assert!(load("/nonexistent/path/to/motd.txt").is_none());
    }

    #[test]
    fn reads_lines_from_existing_file() {
        let mut path = std::env::temp_dir();
        path.push(format!("irc_server_motd_test_{}.txt", std::process::id()));
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "line one").unwrap();
        writeln!(f, "line two").unwrap();

        let lines = load(&path).unwrap();
        assert_eq!(lines, vec!["line one".to_string(), "line two".to_string()]);

        fs::remove_file(&path).unwrap();
    }
}
