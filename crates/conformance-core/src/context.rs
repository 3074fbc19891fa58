//! Per-unit context handed to rules.

use crate::imports::ImportContext;
use crate::semantic::{SemanticModel, TypeResolver};
use std::path::{Path, PathBuf};

/// Everything a rule may consult about the current analysis unit.
///
/// Built once per unit from what the host supplies and discarded with it;
/// nothing is shared across units.
pub struct SemanticContext<'a> {
    model: SemanticModel<'a>,
    imports: ImportContext,
    file: PathBuf,
    start_line: usize,
}

impl<'a> SemanticContext<'a> {
    /// Creates a context for one analysis unit.
    #[must_use]
    pub fn new(
        resolver: &'a dyn TypeResolver,
        imports: ImportContext,
        file: impl Into<PathBuf>,
        start_line: usize,
    ) -> Self {
        Self {
            model: SemanticModel::new(resolver),
            imports,
            file: file.into(),
            start_line,
        }
    }

    /// The unit-local semantic model.
    #[must_use]
    pub fn model(&self) -> &SemanticModel<'a> {
        &self.model
    }

    /// The unit's import/alias table.
    #[must_use]
    pub fn imports(&self) -> &ImportContext {
        &self.imports
    }

    /// The unit's file path.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// The unit's starting source line (1-indexed).
    #[must_use]
    pub fn start_line(&self) -> usize {
        self.start_line
    }

    /// Maps a 1-indexed line inside the unit's subtree to a source line.
    #[must_use]
    pub fn absolute_line(&self, relative_line: usize) -> usize {
        self.start_line + relative_line.saturating_sub(1)
    }
}
