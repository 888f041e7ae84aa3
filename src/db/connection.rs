//! Scoped connection handling.

use std::ops::{Deref, DerefMut};

use super::backend::{Connection, ConnectionProvider};
use crate::error::Result;

/// A connection that is closed when it goes out of scope.
///
/// Every DAO operation holds one of these, so the connection is released on
/// success, on error returns and on unwinding alike.
pub struct ScopedConnection {
    inner: Box<dyn Connection>,
    closed: bool,
}

impl ScopedConnection {
    pub fn acquire<P: ConnectionProvider + ?Sized>(provider: &P) -> Result<Self> {
        Ok(Self::new(provider.acquire()?))
    }

    pub fn new(inner: Box<dyn Connection>) -> Self {
        Self { inner, closed: false }
    }

    /// Close now and report whether the close succeeded.
    pub fn close(mut self) -> bool {
        self.release()
    }

    fn release(&mut self) -> bool {
        if self.closed {
            return true;
        }
        self.closed = true;
        let ok = self.inner.close();
        if !ok {
            tracing::warn!(
                backend = self.inner.backend_name(),
                error = self.inner.last_error(),
                "failed to close connection"
            );
        }
        ok
    }
}

impl Deref for ScopedConnection {
    type Target = dyn Connection;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl DerefMut for ScopedConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner.as_mut()
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        self.release();
    }
}
