// Action failure delivered to the error handler

use super::action::BoxError;
use thiserror::Error;

/// Failure raised while running a submitted action.
///
/// The queue never inspects or wraps the action's own error beyond choosing
/// the variant: `Failed` carries it verbatim, so handlers can downcast to the
/// concrete type the action returned.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Action failed: {0}")]
    Failed(#[source] BoxError),

    #[error("Action panicked: {0}")]
    Panicked(String),
}

impl ActionError {
    /// True if the action unwound instead of returning an error
    pub fn is_panic(&self) -> bool {
        matches!(self, ActionError::Panicked(_))
    }

    /// Borrow the action's own error as a concrete type
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            ActionError::Failed(err) => err.downcast_ref::<E>(),
            ActionError::Panicked(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("disk full")]
    struct DiskFull;

    #[test]
    fn test_failed_keeps_original_error() {
        let err = ActionError::Failed(Box::new(DiskFull));
        assert!(!err.is_panic());
        assert!(err.downcast_ref::<DiskFull>().is_some());
        assert_eq!(err.to_string(), "Action failed: disk full");
    }

    #[test]
    fn test_panicked_has_no_source() {
        let err = ActionError::Panicked("boom".to_string());
        assert!(err.is_panic());
        assert!(err.downcast_ref::<DiskFull>().is_none());
        assert!(std::error::Error::source(&err).is_none());
    }
}
