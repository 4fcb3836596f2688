//! Desktop entry parsing.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::types::AppSource;

const DESKTOP_ENTRY_SECTION: &str = "[Desktop Entry]";
const SOURCE_SECTION: &str = "[X-Fyne Source]";

/// Fields read from a .desktop file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DesktopEntry {
    /// File name, e.g. "firefox.desktop".
    pub id: String,
    pub name: String,
    pub icon_name: String,
    /// Set when `Icon=` already points at an existing file.
    pub icon_path: Option<PathBuf>,
    pub exec: String,
    pub categories: Vec<String>,
    pub mime_types: Vec<String>,
    pub no_display: bool,
    pub source: Option<AppSource>,
    pub desktop_file_path: PathBuf,
}

impl DesktopEntry {
    /// Parse desktop entry text. Unknown keys, other sections and lines
    /// without `=` are skipped.
    pub fn parse(content: &str) -> Self {
        let mut entry = DesktopEntry::default();
        let mut section = "";

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with('[') {
                section = trimmed;
                if section == SOURCE_SECTION && entry.source.is_none() {
                    entry.source = Some(AppSource::default());
                }
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();

            match section {
                SOURCE_SECTION => {
                    let source = entry.source.get_or_insert_with(AppSource::default);
                    match key {
                        "Repo" => source.repo = value.to_string(),
                        "Dir" => source.dir = value.to_string(),
                        _ => {}
                    }
                }
                DESKTOP_ENTRY_SECTION => entry.apply(key, value),
                _ => {}
            }
        }

        entry
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "Name" => self.name = value.to_string(),
            "Icon" => {
                self.icon_name = value.to_string();
                let path = Path::new(value);
                self.icon_path = (path.is_absolute() && path.exists()).then(|| path.to_path_buf());
            }
            "Exec" => self.exec = value.to_string(),
            "Categories" => self.categories = split_list(value),
            "MimeType" => self.mime_types = split_list(value),
            "NoDisplay" => self.no_display = value.trim() == "true",
            _ => {}
        }
    }
}

/// Parse a .desktop file into a DesktopEntry struct.
pub fn parse_desktop_file(path: &Path) -> Result<DesktopEntry> {
    let bytes = fs::read(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    // Legacy encodings in localized keys must not hide the entry.
    let mut entry = DesktopEntry::parse(&String::from_utf8_lossy(&bytes));
    if entry.name.is_empty() {
        return Err(AppError::MissingName(path.to_path_buf()));
    }

    entry.id = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    entry.desktop_file_path = path.to_path_buf();
    Ok(entry)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(';')
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Expand the field codes of an `Exec` command line.
///
/// `%u` and `%f` take the next parameter, `%U` and `%F` take all that are
/// left. Codes with nothing left to take are dropped. Every other token,
/// unknown `%` codes included, is kept as written.
pub fn extract_args<A, P>(args: &[A], params: &[P]) -> Vec<String>
where
    A: AsRef<str>,
    P: AsRef<str>,
{
    let mut remaining = params.iter().map(|p| p.as_ref().to_string());
    let mut out = Vec::with_capacity(args.len() + params.len());

    for arg in args {
        match arg.as_ref() {
            "%u" | "%f" => out.extend(remaining.next()),
            "%U" | "%F" => out.extend(remaining.by_ref()),
            other => out.push(other.to_string()),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_desktop_entry_fields() {
        let entry = DesktopEntry::parse(
            "[Desktop Entry]\n\
             Type=Application\n\
             Name=App1\n\
             Exec=app1 %U\n\
             Icon=app1\n\
             Categories=App1;Utility\n\
             MimeType=text/plain;image/png;\n\
             NoDisplay=false\n",
        );

        assert_eq!(entry.name, "App1");
        assert_eq!(entry.exec, "app1 %U");
        assert_eq!(entry.icon_name, "app1");
        assert_eq!(entry.icon_path, None);
        assert_eq!(entry.categories, vec!["App1", "Utility"]);
        assert_eq!(entry.mime_types, vec!["text/plain", "image/png"]);
        assert!(!entry.no_display);
        assert!(entry.source.is_none());
    }

    #[test]
    fn test_name_keeps_everything_after_first_equals() {
        let entry = DesktopEntry::parse("[Desktop Entry]\nName=a=b = c \n");
        assert_eq!(entry.name, "a=b = c ");

        let entry = DesktopEntry::parse("[Desktop Entry]\nName=x==y\n");
        assert_eq!(entry.name, "x==y");
    }

    #[test]
    fn test_other_sections_do_not_override() {
        let entry = DesktopEntry::parse(
            "[Desktop Entry]\nName=Main\nExec=main\n\
             [Desktop Action new-window]\nName=New Window\nExec=main --new\n",
        );
        assert_eq!(entry.name, "Main");
        assert_eq!(entry.exec, "main");
    }

    #[test]
    fn test_localized_keys_are_ignored() {
        let entry = DesktopEntry::parse("[Desktop Entry]\nName=Files\nName[de]=Dateien\n");
        assert_eq!(entry.name, "Files");
    }

    #[test]
    fn test_no_display_true_hides() {
        let entry = DesktopEntry::parse("[Desktop Entry]\nName=Hidden\nNoDisplay=true \n");
        assert!(entry.no_display);

        let entry = DesktopEntry::parse("[Desktop Entry]\nName=Shown\nNoDisplay=True\n");
        assert!(!entry.no_display);
    }

    #[test]
    fn test_source_section_anywhere() {
        let before = DesktopEntry::parse(
            "[X-Fyne Source]\nRepo=https://example.com/repo\nDir=cmd/dir\n\
             [Desktop Entry]\nName=App2\n",
        );
        let after = DesktopEntry::parse(
            "[Desktop Entry]\nName=App2\n\
             [X-Fyne Source]\nRepo=https://example.com/repo\nDir=cmd/dir\n",
        );

        let expected = Some(AppSource {
            repo: "https://example.com/repo".to_string(),
            dir: "cmd/dir".to_string(),
        });
        assert_eq!(before.source, expected);
        assert_eq!(after.source, expected);
        assert_eq!(before.name, "App2");
        assert_eq!(after.name, "App2");
    }

    #[test]
    fn test_source_section_does_not_set_name() {
        let entry = DesktopEntry::parse("[Desktop Entry]\nName=Real\n[X-Fyne Source]\nName=Fake\n");
        assert_eq!(entry.name, "Real");
        assert_eq!(entry.source, Some(AppSource::default()));
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let entry = DesktopEntry::parse(
            "garbage before any section\n[Desktop Entry]\nthis line has no equals\n# comment\nName=Ok\n",
        );
        assert_eq!(entry.name, "Ok");
    }

    #[test]
    fn test_non_utf8_line_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("editeur.desktop");
        fs::write(
            &path,
            b"[Desktop Entry]\nName=Editeur\nComment[fr]=\xe9diteur de texte\nExec=editeur %f\n",
        )
        .unwrap();

        let entry = parse_desktop_file(&path).unwrap();
        assert_eq!(entry.name, "Editeur");
        assert_eq!(entry.exec, "editeur %f");
    }

    #[test]
    fn test_icon_that_is_a_path() {
        let tmp = tempfile::tempdir().unwrap();
        let icon = tmp.path().join("app3.png");
        fs::write(&icon, b"png").unwrap();

        let entry = DesktopEntry::parse(&format!("[Desktop Entry]\nName=App3\nIcon={}\n", icon.display()));
        assert_eq!(entry.icon_path, Some(icon.clone()));
        assert_eq!(entry.icon_name, icon.display().to_string());

        let missing = tmp.path().join("gone.png");
        let entry = DesktopEntry::parse(&format!("[Desktop Entry]\nName=App3\nIcon={}\n", missing.display()));
        assert_eq!(entry.icon_path, None);
    }

    #[test]
    fn test_parse_desktop_file_sets_id_and_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("app1.desktop");
        fs::write(&path, "[Desktop Entry]\nName=App1\n").unwrap();

        let entry = parse_desktop_file(&path).unwrap();
        assert_eq!(entry.id, "app1.desktop");
        assert_eq!(entry.desktop_file_path, path);
    }

    #[test]
    fn test_parse_desktop_file_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let nameless = tmp.path().join("nameless.desktop");
        fs::write(&nameless, "[Desktop Entry]\nExec=thing\n").unwrap();

        assert!(matches!(
            parse_desktop_file(&nameless),
            Err(AppError::MissingName(_))
        ));
        assert!(matches!(
            parse_desktop_file(&tmp.path().join("missing.desktop")),
            Err(AppError::Io { .. })
        ));
    }

    #[test]
    fn test_extract_args_single_url() {
        let extracted = extract_args(&["-u", "thing", "%u"], &["https://example.com"]);
        assert_eq!(extracted, vec!["-u", "thing", "https://example.com"]);
    }

    #[test]
    fn test_extract_args_list_takes_the_rest() {
        let extracted = extract_args(&["app", "%U", "--then", "%u", "%F"], &["a", "b", "c"]);
        assert_eq!(extracted, vec!["app", "a", "b", "c", "--then"]);
    }

    #[test]
    fn test_extract_args_params_shared_in_order() {
        let extracted = extract_args(&["diff", "%f", "%f", "%f"], &["left", "right"]);
        assert_eq!(extracted, vec!["diff", "left", "right"]);
    }

    #[test]
    fn test_extract_args_unknown_codes_are_literal() {
        let no_params: [&str; 0] = [];
        let extracted = extract_args(&["app", "%i", "%c", "%uu", "%"], &no_params);
        assert_eq!(extracted, vec!["app", "%i", "%c", "%uu", "%"]);
    }
}
