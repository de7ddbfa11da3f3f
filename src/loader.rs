use std::{io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::release::ReleaseSpec;

#[derive(Serialize, Deserialize, Default, Debug)]
pub struct ReleaseFile {
    pub releases: Vec<ReleaseSpec>,
}

/// Loads every release found at `path`, a single file or a directory of
/// `.yaml`/`.yml` files.
pub fn load_releases(path: &Path) -> Result<Vec<ReleaseSpec>> {
    if !path.is_dir() {
        return load_releases_from(path);
    }

    log::info!("Loading releases from {:?}", path);
    let mut releases = vec![];

    for entry in WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };

        if !file_name.ends_with(".yaml") && !file_name.ends_with(".yml") {
            continue;
        }

        releases.extend(load_releases_from(entry.path())?);
    }

    Ok(releases)
}

fn load_releases_from(file_path: &Path) -> Result<Vec<ReleaseSpec>> {
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("Couldn't read {:?}", file_path))?;

    let reader = BufReader::new(content.as_bytes());
    let documents = yaml_split::DocumentIterator::new(reader);
    let mut releases = vec![];
    for document in documents {
        let document = document.with_context(|| format!("Couldn't split {:?}", file_path))?;
        let Ok(parsed) = serde_yaml::from_str::<ReleaseFile>(&document) else {
            log::debug!("Couldn't parse a document of {:?}. Ignoring it.", file_path);
            continue;
        };

        releases.extend(parsed.releases);
    }

    Ok(releases)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn loads_every_document_of_a_file() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "helmfile.yaml",
            "releases:\n  - name: a\n---\nreleases:\n  - name: b\n  - name: c\n",
        );

        let releases = load_releases(&dir.path().join("helmfile.yaml")).unwrap();
        let names: Vec<_> = releases.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn walks_directories_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        write(dir.path(), "b.yml", "releases:\n  - name: second\n");
        write(dir.path(), "a.yaml", "releases:\n  - name: first\n");
        write(&dir.path().join("nested"), "c.yaml", "releases:\n  - name: third\n");
        write(dir.path(), "notes.txt", "releases:\n  - name: ignored\n");

        let releases = load_releases(dir.path()).unwrap();
        let names: Vec<_> = releases.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn skips_documents_that_are_not_release_files() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "mixed.yaml",
            "- just\n- a list\n---\nreleases:\n  - name: kept\n",
        );

        let releases = load_releases(&dir.path().join("mixed.yaml")).unwrap();
        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].name, "kept");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_releases(&dir.path().join("absent.yaml")).is_err());
    }
}
