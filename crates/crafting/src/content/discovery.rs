use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub(crate) struct ReadError {
    pub path: PathBuf,
    pub source: io::Error,
}

/// A defs file found under a content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct XmlSource {
    /// Path relative to the root, `/`-separated.
    pub rel_path: String,
    pub path: PathBuf,
}

/// Every `*.xml` file under `root`, ordered by normalized relative path.
pub(crate) fn collect_xml_files_sorted(root: &Path) -> Result<Vec<XmlSource>, ReadError> {
    let mut files = Vec::<XmlSource>::new();
    collect_recursive(root, root, &mut files)?;
    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(files)
}

fn collect_recursive(
    root: &Path,
    current: &Path,
    files: &mut Vec<XmlSource>,
) -> Result<(), ReadError> {
    let entries = fs::read_dir(current).map_err(|source| ReadError {
        path: current.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| ReadError {
            path: current.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_recursive(root, &path, files)?;
            continue;
        }
        if !is_xml_file(&path) {
            continue;
        }
        let Ok(rel) = path.strip_prefix(root) else {
            continue;
        };
        files.push(XmlSource {
            rel_path: normalize_rel_path(rel),
            path: path.clone(),
        });
    }
    Ok(())
}

fn is_xml_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}

fn normalize_rel_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn xml_files_are_sorted_by_relative_path_and_filtered() {
        let temp = TempDir::new().expect("tempdir");
        let dir = temp.path();
        fs::create_dir_all(dir.join("b").join("nested")).expect("mkdir");
        fs::write(dir.join("b").join("nested").join("z.xml"), "<Defs/>").expect("write");
        fs::write(dir.join("a.XML"), "<Defs/>").expect("write");
        fs::write(dir.join("c.xml"), "<Defs/>").expect("write");
        fs::write(dir.join("notes.txt"), "ignore me").expect("write");

        let files = collect_xml_files_sorted(dir).unwrap_or_else(|_| panic!("collect"));
        let rel = files
            .iter()
            .map(|source| source.rel_path.as_str())
            .collect::<Vec<_>>();
        assert_eq!(rel, ["a.XML", "b/nested/z.xml", "c.xml"]);
    }

    #[test]
    fn missing_root_reports_path() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("absent");
        let Err(error) = collect_xml_files_sorted(&missing) else {
            panic!("expected read error");
        };
        assert_eq!(error.path, missing);
        assert_eq!(error.source.kind(), io::ErrorKind::NotFound);
    }
}
