use rota_types::{EmptyNameError, PersonId};
use thiserror::Error;

/// Failures surfaced by [`crate::HistoryStore`] operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    EmptyName(#[from] EmptyNameError),

    #[error("a person named '{0}' already exists")]
    DuplicateName(String),

    #[error("no person with id {0}")]
    NotFound(PersonId),

    #[error("assignment refers to an unknown person (main {main}, assistant {assistant})")]
    ForeignKey { main: PersonId, assistant: PersonId },

    #[error("a person cannot be paired with themselves (id {0})")]
    SamePerson(PersonId),

    #[error("failed to {action}: {source}")]
    Io {
        action: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

impl StoreError {
    pub(crate) fn io(action: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| Self::Io { action, source }
    }

    /// True for durability/connection failures as opposed to rejected input.
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
