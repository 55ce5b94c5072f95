use std::sync::{Arc, Weak};

use crate::connection::SessionShared;
use crate::error::{Error, Result};

/// A server-side prepared statement.
///
/// The handle holds a [`Weak`] reference to its session's shared state: it
/// never keeps the session alive, and every use is validated against the
/// session it came from. A statement whose session is gone or closed fails
/// with [`Error::BadConnection`].
#[derive(Debug, Clone)]
pub struct MySqlStatement {
    pub(crate) statement_id: u32,
    pub(crate) param_count: u16,
    pub(crate) column_count: u16,
    pub(crate) session: Weak<SessionShared>,
}

impl MySqlStatement {
    /// The server-assigned statement id.
    pub fn id(&self) -> u32 {
        self.statement_id
    }

    /// The number of `?` placeholders.
    pub fn param_count(&self) -> usize {
        self.param_count as usize
    }

    /// The number of columns in the statement's result set, or 0.
    pub fn column_count(&self) -> usize {
        self.column_count as usize
    }

    /// Fails unless the statement belongs to `session` and that session is
    /// still open.
    pub(crate) fn validate(&self, session: &Arc<SessionShared>) -> Result<()> {
        match self.session.upgrade() {
            Some(owner) if Arc::ptr_eq(&owner, session) && !owner.is_closed() => Ok(()),
            _ => Err(Error::BadConnection),
        }
    }
}
