//! Component lifecycle state.
//!
//! Both the simulation engine and the renderer move through the same states:
//!
//! | State | Entered by | Allowed operations |
//! |-------|------------|--------------------|
//! | `Uninitialized` | construction | `initialize`, `teardown` |
//! | `Ready` | successful `initialize` | everything; `reset` and re-`initialize` stay `Ready` |
//! | `TornDown` | `teardown` | `teardown` (no-op) |
//!
//! Calling anything else outside `Ready` yields [`FluidError::Lifecycle`].

use std::fmt;

use crate::error::{FluidError, Result};

/// Lifecycle state of a simulation engine or renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// Constructed but not yet initialized.
    #[default]
    Uninitialized,
    /// Resources are allocated; stepping / rendering is permitted.
    Ready,
    /// Resources were released; the component cannot be used again.
    TornDown,
}

impl Lifecycle {
    /// Returns `Ok(())` when in `Ready`, otherwise a lifecycle error naming `operation`.
    pub fn ensure_ready(self, operation: &'static str) -> Result<()> {
        match self {
            Lifecycle::Ready => Ok(()),
            state => Err(FluidError::Lifecycle { operation, state }),
        }
    }

    /// Returns `Ok(())` unless the component has been torn down.
    ///
    /// Initialization is accepted from `Uninitialized` and from `Ready`
    /// (re-initialization replaces the held resources).
    pub fn ensure_alive(self, operation: &'static str) -> Result<()> {
        match self {
            Lifecycle::TornDown => Err(FluidError::Lifecycle {
                operation,
                state: Lifecycle::TornDown,
            }),
            _ => Ok(()),
        }
    }

    #[inline]
    pub fn is_ready(self) -> bool {
        self == Lifecycle::Ready
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Uninitialized => write!(f, "uninitialized"),
            Lifecycle::Ready => write!(f, "ready"),
            Lifecycle::TornDown => write!(f, "torn down"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_allows_operations() {
        assert!(Lifecycle::Ready.ensure_ready("step").is_ok());
    }

    #[test]
    fn test_uninitialized_and_torn_down_reject() {
        for state in [Lifecycle::Uninitialized, Lifecycle::TornDown] {
            match state.ensure_ready("render_frame") {
                Err(FluidError::Lifecycle { operation, state: s }) => {
                    assert_eq!(operation, "render_frame");
                    assert_eq!(s, state);
                }
                other => panic!("expected lifecycle error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_initialize_rejected_only_after_teardown() {
        assert!(Lifecycle::Uninitialized.ensure_alive("initialize").is_ok());
        assert!(Lifecycle::Ready.ensure_alive("initialize").is_ok());
        assert!(Lifecycle::TornDown.ensure_alive("initialize").is_err());
    }
}
