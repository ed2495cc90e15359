use std::fs;
use std::path::Path;
use tempfile::TempDir;


// Test utilities and helpers
pub(crate) struct TestUtils;

impl TestUtils {
    pub fn empty_project() -> TempDir {
        TempDir::new().unwrap()
    }

    pub fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    pub fn mkdir(root: &Path, relative: &str) {
        fs::create_dir_all(root.join(relative)).unwrap();
    }

    pub fn descriptor(root: &Path, version: &str, layout: &str) {
        Self::write(
            root,
            "PROJECT",
            &format!("version: \"{}\"\nlayout: {}\n", version, layout),
        );
    }
}
