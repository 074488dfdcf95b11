use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Key-value store backed by `<dir>/<key>.json` files.
#[derive(Debug, Clone)]
pub struct FileRepository {
    dir: PathBuf,
}

impl FileRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Writes `value` under `key`, returning the file it went to.
    pub fn set_item(&self, key: &str, value: &str) -> Result<PathBuf, String> {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            return Err(format!("{}: {}", self.dir.display(), e));
        }
        let path = self.path_for(key);
        match fs::write(&path, value) {
            Ok(_) => Ok(path),
            Err(e) => Err(e.to_string()),
        }
    }

    /// Reads the value stored under `key`, if any.
    pub fn get_item(&self, key: &str) -> Result<Option<String>, String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_item() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileRepository::new(dir.path().join("saves"));

        let path = repo.set_item("session", "{\"layers\":[]}").unwrap();
        assert_eq!(path, dir.path().join("saves").join("session.json"));
        assert_eq!(repo.get_item("session").unwrap().as_deref(), Some("{\"layers\":[]}"));
    }

    #[test]
    fn test_get_missing_item() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileRepository::new(dir.path());
        assert_eq!(repo.get_item("nothing-here").unwrap(), None);
    }

    #[test]
    fn test_set_item_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileRepository::new(dir.path());
        repo.set_item("k", "one").unwrap();
        repo.set_item("k", "two").unwrap();
        assert_eq!(repo.get_item("k").unwrap().as_deref(), Some("two"));
    }
}
