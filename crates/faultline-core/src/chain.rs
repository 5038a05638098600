//! Walking an error's cause chain
//!
//! The only way down the chain is [`std::error::Error::source`], so errors
//! wrapped by other libraries (`anyhow` contexts, `io::Error::other`, custom
//! wrappers) are traversed the same way as [`Error`] values.

use std::error::Error as StdError;

use crate::capability::{self, Probe};
use crate::{Error, Level};

/// Iterator over an error and every cause beneath it
#[derive(Clone)]
pub struct Chain<'a> {
    next: Option<&'a (dyn StdError + 'static)>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn StdError + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.source();
        Some(current)
    }
}

/// Start a walk at `err` itself
pub fn iter<'a>(err: &'a (dyn StdError + 'static)) -> Chain<'a> {
    Chain { next: Some(err) }
}

/// Whether `err` identifies the same failure as `candidate`
///
/// The first error in the chain that exposes a code decides: an [`Error`]
/// value compares `(code, protocol_code)`, a foreign protocol status compares
/// its protocol code. Errors without a code are skipped; a chain with no coded
/// error never matches.
pub fn is_match(err: &(dyn StdError + 'static), candidate: &Error) -> bool {
    iter(err)
        .find_map(capability::probe)
        .is_some_and(|probe| probe.matches(candidate))
}

/// Copy `err` into `target` when it is an [`Error`] value
///
/// Shallow on purpose: only `err` itself is inspected, never its causes.
pub fn cast_as(err: &(dyn StdError + 'static), target: &mut Error) -> bool {
    match capability::as_value(err) {
        Some(value) => {
            target.clone_from(value);
            true
        }
        None => false,
    }
}

/// Borrowing form of [`cast_as`]
pub fn as_error<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a Error> {
    capability::as_value(err)
}

/// First [`Error`] value found while walking the chain
pub fn find_error<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a Error> {
    iter(err).find_map(capability::as_value)
}

/// Whether `err` is a business fault
///
/// An [`Error`] value without a cause was raised on purpose for a bad
/// request; one with a cause reports a failure underneath. Anything that is
/// not an [`Error`] value at all is reported as `true`.
pub fn is_biz_fault(err: &(dyn StdError + 'static)) -> bool {
    capability::as_value(err).is_none_or(|value| value.cause().is_none())
}

/// Severity of the outermost error, or `default` when it carries none
///
/// Causes are not consulted.
pub fn severity_of(err: &(dyn StdError + 'static), default: Level) -> Level {
    capability::level_of(err).unwrap_or(default)
}

/// Whether any [`Error`] value in the chain carries a stack capture
pub fn has_stack(err: &(dyn StdError + 'static)) -> bool {
    stack_captures(err) > 0
}

/// Number of stack captures attached across the chain
pub fn stack_captures(err: &(dyn StdError + 'static)) -> usize {
    iter(err)
        .filter_map(capability::as_value)
        .filter(|value| value.has_stack())
        .count()
}

/// Protocol-aware view of the first coded error in the chain
pub fn first_coded<'a>(err: &'a (dyn StdError + 'static)) -> Option<Probe<'a>> {
    iter(err).find_map(capability::probe)
}
