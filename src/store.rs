//! Policy storage and the settings-side editor
//!
//! The policy lives as JSON text in a single slot owned by the host. This
//! module abstracts that slot behind [`PolicyStore`] and layers the
//! id-addressed edit operations on top of it.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::StoreError;
use crate::parser::{self, edit, ParsedPolicy, RuleType};

/// A single slot holding the policy document text
pub trait PolicyStore {
    /// Current policy text, or `None` when nothing is stored
    fn load(&self) -> Option<String>;

    /// Replace the stored policy text
    fn save(&self, text: &str) -> io::Result<()>;
}

/// Policy stored in a user-editable JSON file
#[derive(Debug, Clone)]
pub struct FilePolicyStore {
    path: PathBuf,
}

impl FilePolicyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl PolicyStore for FilePolicyStore {
    fn load(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot read policy file");
                None
            }
        }
    }

    fn save(&self, text: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, text)
    }
}

/// Policy held in memory, for hosts that persist settings themselves
#[derive(Debug, Default)]
pub struct MemoryPolicyStore {
    text: RwLock<Option<String>>,
}

impl MemoryPolicyStore {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: RwLock::new(Some(text.into())),
        }
    }
}

impl PolicyStore for MemoryPolicyStore {
    fn load(&self) -> Option<String> {
        match self.text.read() {
            Ok(text) => text.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn save(&self, text: &str) -> io::Result<()> {
        let mut slot = match self.text.write() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = Some(text.to_string());
        Ok(())
    }
}

impl<S: PolicyStore + ?Sized> PolicyStore for &S {
    fn load(&self) -> Option<String> {
        (**self).load()
    }

    fn save(&self, text: &str) -> io::Result<()> {
        (**self).save(text)
    }
}

/// Edits the stored policy and hands back the freshly parsed rule list, so
/// callers always hold ids that match the saved document.
pub struct PolicyEditor<S> {
    store: S,
}

impl<S: PolicyStore> PolicyEditor<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The editable rules of the stored policy
    pub fn rules(&self) -> ParsedPolicy {
        parser::parse_policy(&self.source())
    }

    /// Append a rule to the common section
    pub fn add(&self, kind: RuleType, text: &str) -> Result<ParsedPolicy, StoreError> {
        self.apply(|source| edit::add_rule(source, kind, text))
    }

    /// Replace the text of the rule at `id`
    pub fn update(&self, id: &str, text: &str) -> Result<ParsedPolicy, StoreError> {
        self.apply(|source| edit::update_rule(source, id, text))
    }

    /// Remove the rule at `id`
    pub fn remove(&self, id: &str) -> Result<ParsedPolicy, StoreError> {
        self.apply(|source| edit::remove_rule(source, id))
    }

    /// Alias of [`PolicyEditor::remove`] for block rules
    pub fn unblock(&self, id: &str) -> Result<ParsedPolicy, StoreError> {
        self.remove(id)
    }

    fn source(&self) -> String {
        self.store.load().unwrap_or_default()
    }

    fn apply<F>(&self, edit: F) -> Result<ParsedPolicy, StoreError>
    where
        F: FnOnce(&str) -> Result<String, crate::error::EditError>,
    {
        let updated = edit(&self.source())?;
        self.store.save(&updated)?;
        tracing::info!("policy updated");
        Ok(parser::parse_policy(&updated))
    }
}
