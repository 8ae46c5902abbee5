//! Read-only asset bundle addressed by logical name.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// A directory of read-only assets shipped with the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetBundle {
    root: PathBuf,
}

impl AssetBundle {
    /// Open a bundle rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Bundle directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a logical asset name to its file.
    ///
    /// Names are plain file names; anything that would escape the bundle
    /// directory is treated as missing.
    pub fn path_of(&self, name: &str) -> Result<PathBuf> {
        let is_plain = !name.is_empty()
            && Path::new(name).file_name().is_some_and(|f| f == name)
            && name != "."
            && name != "..";

        let path = self.root.join(name);
        if is_plain && path.is_file() {
            Ok(path)
        } else {
            Err(self.not_found(name))
        }
    }

    /// Read an asset's bytes.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path_of(name)?;
        std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => self.not_found(name),
            _ => Error::LoadFailure {
                name: name.to_string(),
                reason: format!("cannot read '{}': {e}", path.display()),
            },
        })
    }

    fn not_found(&self, name: &str) -> Error {
        Error::AssetNotFound {
            name: name.to_string(),
            bundle: self.root.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_existing_asset() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("insect_model.onnx"), b"model-bytes").unwrap();

        let bundle = AssetBundle::new(dir.path());
        assert_eq!(bundle.read("insect_model.onnx").unwrap(), b"model-bytes");
    }

    #[test]
    fn test_missing_asset() {
        let dir = TempDir::new().unwrap();
        let bundle = AssetBundle::new(dir.path());
        let result = bundle.read("insect_model.onnx");
        assert!(matches!(result, Err(Error::AssetNotFound { .. })));
    }

    #[test]
    fn test_directory_is_not_an_asset() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("insect_model.onnx")).unwrap();
        let bundle = AssetBundle::new(dir.path());
        assert!(matches!(
            bundle.path_of("insect_model.onnx"),
            Err(Error::AssetNotFound { .. })
        ));
    }

    #[test]
    fn test_names_cannot_escape_bundle() {
        let dir = TempDir::new().unwrap();
        let inner = dir.path().join("bundle");
        std::fs::create_dir(&inner).unwrap();
        std::fs::write(dir.path().join("secret.onnx"), b"x").unwrap();

        let bundle = AssetBundle::new(&inner);
        for name in ["../secret.onnx", "", "..", "sub/model.onnx"] {
            assert!(
                matches!(bundle.path_of(name), Err(Error::AssetNotFound { .. })),
                "name {name:?}"
            );
        }
    }
}
