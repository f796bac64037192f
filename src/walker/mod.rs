//! # Directory Walker
//!
//! Lazily lists every file below a root directory. Traversal keeps an explicit
//! stack of open directory handles, so deep trees do not grow the call stack.

use std::fs::{self, ReadDir};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A file found during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionFile {
    pub path: PathBuf,
    pub file_name: String,
}

/// Iterator over the files below a root directory.
///
/// Directories are descended into and never yielded. Symbolic links are
/// resolved: links to files are yielded, links to directories are skipped.
#[derive(Debug)]
pub struct WalkFiles {
    stack: Vec<(PathBuf, ReadDir)>,
}

/// Start a walk at `root`.
///
/// Fails with [`Error::Discovery`] when `root` is missing or unreadable. Call
/// again to restart the sequence.
pub fn walk(root: impl AsRef<Path>) -> Result<WalkFiles> {
    let root = root.as_ref().to_path_buf();
    let entries = fs::read_dir(&root).map_err(|source| Error::Discovery {
        path: root.clone(),
        source,
    })?;

    Ok(WalkFiles {
        stack: vec![(root, entries)],
    })
}

impl Iterator for WalkFiles {
    type Item = Result<CollectionFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (dir, entries) = self.stack.last_mut()?;
            let entry = match entries.next() {
                Some(Ok(entry)) => entry,
                Some(Err(source)) => {
                    let path = dir.clone();
                    return Some(Err(Error::Discovery { path, source }));
                }
                None => {
                    self.stack.pop();
                    continue;
                }
            };

            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(source) => return Some(Err(Error::Discovery { path, source })),
            };

            if file_type.is_dir() {
                match fs::read_dir(&path) {
                    Ok(children) => self.stack.push((path, children)),
                    Err(source) => return Some(Err(Error::Discovery { path, source })),
                }
                continue;
            }

            if file_type.is_symlink() {
                match fs::metadata(&path) {
                    Ok(target) if target.is_file() => {}
                    // Dangling links and links to directories.
                    _ => continue,
                }
            } else if !file_type.is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().into_owned();
            return Some(Ok(CollectionFile { path, file_name }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs::File;
    use tempfile::tempdir;

    fn names(root: &Path) -> BTreeSet<String> {
        walk(root)
            .unwrap()
            .map(|file| file.unwrap().file_name)
            .collect()
    }

    #[test]
    fn yields_files_from_nested_directories() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("users").join("admin");
        fs::create_dir_all(&nested).unwrap();
        File::create(dir.path().join("health.json")).unwrap();
        File::create(dir.path().join("users").join("list.json")).unwrap();
        File::create(nested.join("create.json")).unwrap();

        let found: Vec<CollectionFile> = walk(dir.path()).unwrap().map(Result::unwrap).collect();
        assert_eq!(found.len(), 3);

        let expected: BTreeSet<String> = ["health.json", "list.json", "create.json"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(names(dir.path()), expected);

        let create = found.iter().find(|f| f.file_name == "create.json").unwrap();
        assert_eq!(create.path, nested.join("create.json"));
    }

    #[test]
    fn never_yields_directories() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("empty").join("deeper")).unwrap();
        fs::create_dir(dir.path().join("folder.json")).unwrap();

        assert!(names(dir.path()).is_empty());
    }

    #[test]
    fn walk_is_restartable() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("a.json")).unwrap();
        File::create(dir.path().join("b.txt")).unwrap();

        assert_eq!(names(dir.path()), names(dir.path()));
        assert_eq!(walk(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn missing_root_is_a_discovery_error() {
        let dir = tempdir().unwrap();
        let err = walk(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, Error::Discovery { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_not_followed() {
        let dir = tempdir().unwrap();
        let real = dir.path().join("real");
        fs::create_dir(&real).unwrap();
        File::create(real.join("inside.json")).unwrap();
        std::os::unix::fs::symlink(&real, dir.path().join("loop")).unwrap();
        std::os::unix::fs::symlink(real.join("inside.json"), dir.path().join("alias.json")).unwrap();

        let found: Vec<String> = walk(dir.path())
            .unwrap()
            .map(|file| file.unwrap().file_name)
            .collect();
        assert_eq!(found.len(), 2);
        assert!(found.contains(&"inside.json".to_string()));
        assert!(found.contains(&"alias.json".to_string()));
    }
}
