// SPDX-License-Identifier: Apache-2.0

use crate::store::CartLine;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Where a cart survives between sessions. The browser build of the
/// storefront uses local storage; the desktop and test builds use
/// [`JsonFileCart`].
pub trait CartPersistence: Send + Sync {
    fn load(&self) -> Result<Vec<CartLine>, PersistError>;
    fn save(&self, lines: &[CartLine]) -> Result<(), PersistError>;
}

#[derive(Debug)]
#[non_exhaustive]
pub enum PersistError {
    Io(std::io::Error),
    Corrupt(serde_json::Error),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "cart storage io error: {e}"),
            Self::Corrupt(e) => write!(f, "cart storage holds invalid json: {e}"),
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Corrupt(e) => Some(e),
        }
    }
}

/// No-op adapter for ephemeral carts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPersistence;

impl CartPersistence for NoopPersistence {
    fn load(&self) -> Result<Vec<CartLine>, PersistError> {
        Ok(Vec::new())
    }

    fn save(&self, _lines: &[CartLine]) -> Result<(), PersistError> {
        Ok(())
    }
}

/// One JSON file holding the full line list. A missing file is an empty
/// cart; a corrupt file is surfaced so the caller can decide to reset it.
#[derive(Debug, Clone)]
pub struct JsonFileCart {
    path: PathBuf,
}

impl JsonFileCart {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CartPersistence for JsonFileCart {
    fn load(&self) -> Result<Vec<CartLine>, PersistError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PersistError::Io(e)),
        };
        serde_json::from_str(&raw).map_err(PersistError::Corrupt)
    }

    fn save(&self, lines: &[CartLine]) -> Result<(), PersistError> {
        let raw = serde_json::to_string_pretty(lines).map_err(PersistError::Corrupt)?;
        // Write-then-rename so a crash mid-save never truncates the cart.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(PersistError::Io)?;
        fs::rename(&tmp, &self.path).map_err(PersistError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::line;

    #[test]
    fn missing_file_loads_as_empty_cart() {
        let dir = tempfile::tempdir().unwrap();
        let cart = JsonFileCart::new(dir.path().join("cart.json"));
        assert!(cart.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_round_trips_lines() {
        let dir = tempfile::tempdir().unwrap();
        let cart = JsonFileCart::new(dir.path().join("cart.json"));
        let lines = vec![line(1, Some("30x40"), 2), line(2, None, 5)];
        cart.save(&lines).unwrap();
        assert_eq!(cart.load().unwrap(), lines);
    }

    #[test]
    fn persistent_cart_survives_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        {
            let mut cart =
                crate::CartStore::with_persistence(Box::new(JsonFileCart::new(&path))).unwrap();
            cart.add(line(1, Some("30x40"), 2));
            cart.add(line(2, None, 1));
        }
        let cart = crate::CartStore::with_persistence(Box::new(JsonFileCart::new(&path))).unwrap();
        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.unit_count(), 3);
    }

    #[test]
    fn corrupt_file_is_reported_not_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        fs::write(&path, "{not json").unwrap();
        let cart = JsonFileCart::new(path);
        assert!(matches!(cart.load(), Err(PersistError::Corrupt(_))));
    }
}
