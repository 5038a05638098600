use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::{Level, ProtocolCode, chain};

/// Shared handle to a wrapped cause
pub type Cause = Arc<dyn StdError + Send + Sync + 'static>;

/// Display code reported for a successful operation
pub const SUCCESS_CODE: i32 = 0;

/// Display code used when no specific code applies
pub const DEFAULT_ERROR_CODE: i32 = -1;

/// Structured error value
///
/// Carries a stable display `code`, a user-facing `reason`, an internal
/// `message`, a protocol status code, a severity and an optional cause.
/// Two values are equal when their `(code, protocol_code)` pairs are equal;
/// reason, message and cause do not take part in identity.
///
/// Values are immutable by convention: the `with_*` builders fork a new value
/// and leave the receiver untouched. The `set_*` methods mutate in place and
/// exist for building an ad hoc value before it is returned or shared.
#[derive(Debug, Clone)]
pub struct Error {
    code: i32,
    reason: Cow<'static, str>,
    message: Cow<'static, str>,
    protocol_code: ProtocolCode,
    level: Level,
    cause: Option<Cause>,
    stack: Option<Arc<Backtrace>>,
}

impl Error {
    /// Build a root error; the protocol code is derived from `code`
    pub fn new(code: i32, reason: impl Into<Cow<'static, str>>, level: Level) -> Self {
        Self {
            code,
            reason: reason.into(),
            message: Cow::Borrowed(""),
            protocol_code: ProtocolCode::from_display(code),
            level,
            cause: None,
            stack: None,
        }
    }

    /// Build a root error logged at [`Level::Error`]
    pub fn with_default_level(code: i32, reason: impl Into<Cow<'static, str>>) -> Self {
        Self::new(code, reason, Level::Error)
    }

    /// Build a root error that already carries an internal message
    pub fn with_detail(
        code: i32,
        reason: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            message: message.into(),
            ..Self::with_default_level(code, reason)
        }
    }

    pub const fn code(&self) -> i32 {
        self.code
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Internal detail; empty when none was attached
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Diagnostic text: the message, or the cause's text when no message was set
    pub fn detail(&self) -> Cow<'_, str> {
        if self.message.is_empty() {
            self.cause.as_ref().map_or(Cow::Borrowed(""), |cause| Cow::Owned(cause.to_string()))
        } else {
            Cow::Borrowed(&*self.message)
        }
    }

    pub const fn protocol_code(&self) -> ProtocolCode {
        self.protocol_code
    }

    pub const fn level(&self) -> Level {
        self.level
    }

    /// The wrapped cause, if this is not the root of its chain
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Stack captured when this value was wrapped
    pub fn stack_trace(&self) -> Option<&Backtrace> {
        self.stack.as_deref()
    }

    pub const fn has_stack(&self) -> bool {
        self.stack.is_some()
    }

    /// Whether `err`, or the first coded error in its chain, is this error
    pub fn matches(&self, err: &(dyn StdError + 'static)) -> bool {
        chain::is_match(err, self)
    }

    /// Attach `cause` and make sure the chain carries exactly one stack capture
    #[must_use]
    pub fn wrap<E>(&self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.wrap_shared(Arc::new(cause))
    }

    /// [`Error::wrap`] for a cause that is already type-erased
    #[must_use]
    pub fn wrap_shared(&self, cause: Cause) -> Self {
        let mut wrapped = self.clone();
        wrapped.cause = Some(cause);
        wrapped.ensure_stack();
        wrapped
    }

    /// Like [`Error::wrap`], but also copies the cause's text into `message`
    ///
    /// With no cause, the receiver comes back unchanged apart from the stack
    /// capture.
    #[must_use]
    pub fn with_wrap<E>(&self, cause: Option<E>) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        match cause {
            Some(cause) => {
                let message = cause.to_string();
                let mut wrapped = self.wrap(cause);
                wrapped.message = Cow::Owned(message);
                wrapped
            }
            None => {
                let mut unchanged = self.clone();
                unchanged.ensure_stack();
                unchanged
            }
        }
    }

    /// Fork with a new internal message
    #[must_use]
    pub fn with_message(&self, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            ..self.clone()
        }
    }

    /// Fork with a formatted internal message, e.g. `format_args!("user {id}")`
    #[must_use]
    pub fn with_message_fmt(&self, args: fmt::Arguments<'_>) -> Self {
        self.with_message(fmt::format(args))
    }

    /// Fork with a new reason
    #[must_use]
    pub fn with_reason(&self, reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            reason: reason.into(),
            ..self.clone()
        }
    }

    /// Fork with a formatted reason
    #[must_use]
    pub fn with_reason_fmt(&self, args: fmt::Arguments<'_>) -> Self {
        self.with_reason(fmt::format(args))
    }

    /// Overwrite the protocol code in place
    ///
    /// Only for values the caller exclusively owns and has not yet shared.
    /// Catalog sentinels must be forked first; `&mut self` keeps a shared
    /// sentinel from being changed through this path.
    pub const fn set_protocol_code(&mut self, code: ProtocolCode) -> &mut Self {
        self.protocol_code = code;
        self
    }

    /// Overwrite the reason in place; same ownership rules as
    /// [`Error::set_protocol_code`]
    pub fn set_reason(&mut self, reason: impl Into<Cow<'static, str>>) -> &mut Self {
        self.reason = reason.into();
        self
    }

    /// Overwrite the message in place; same ownership rules as
    /// [`Error::set_protocol_code`]
    pub fn set_message(&mut self, message: impl Into<Cow<'static, str>>) -> &mut Self {
        self.message = message.into();
        self
    }

    /// Keep a single capture per chain: defer to one further down, otherwise
    /// capture here if this value has none yet
    fn ensure_stack(&mut self) {
        let captured_below = self.cause.as_deref().is_some_and(|cause| chain::has_stack(cause));

        if captured_below {
            self.stack = None;
        } else if self.stack.is_none() {
            self.stack = Some(Arc::new(Backtrace::capture()));
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code: {}, reason: {}", self.code, self.reason)?;

        if !self.message.is_empty() {
            write!(f, ", message: {}", self.message)?;
        }
        if let Some(cause) = &self.cause {
            write!(f, ", detail: {cause}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_deref().map(|cause| cause as &(dyn StdError + 'static))
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.protocol_code == other.protocol_code
    }
}

impl Eq for Error {}

impl Hash for Error {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
        self.protocol_code.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    fn not_found() -> Error {
        Error::new(404, "not found", Level::Info)
    }

    #[test]
    fn new_derives_protocol_code() {
        let err = not_found();
        assert_eq!(err.code(), 404);
        assert_eq!(err.protocol_code(), ProtocolCode::new(404));
        assert_eq!(err.level(), Level::Info);
        assert!(err.message().is_empty());
        assert!(err.cause().is_none());
        assert!(!err.has_stack());
    }

    #[test]
    fn default_level_is_error() {
        assert_eq!(Error::with_default_level(500, "boom").level(), Level::Error);
        let detailed = Error::with_detail(500, "boom", "disk full");
        assert_eq!(detailed.message(), "disk full");
        assert_eq!(detailed.level(), Level::Error);
    }

    #[test]
    fn wrap_keeps_identity_and_attaches_cause() {
        let sentinel = not_found();
        let wrapped = sentinel.wrap(io::Error::other("original"));

        assert_eq!(wrapped, sentinel);
        assert_eq!(wrapped.reason(), "not found");
        assert_eq!(wrapped.level(), Level::Info);
        assert!(wrapped.message().is_empty());
        assert_eq!(wrapped.cause().map(ToString::to_string).as_deref(), Some("original"));
        assert!(wrapped.has_stack());

        // the sentinel itself is untouched
        assert!(sentinel.cause().is_none());
        assert!(!sentinel.has_stack());
    }

    #[test]
    fn with_wrap_copies_cause_text_into_message() {
        let wrapped = not_found().with_wrap(Some(io::Error::other("row missing")));
        assert_eq!(wrapped.message(), "row missing");
        assert!(wrapped.cause().is_some());
        assert!(wrapped.has_stack());
    }

    #[test]
    fn with_wrap_without_cause_only_adds_stack() {
        let sentinel = not_found().with_message("kept");
        let same = sentinel.with_wrap(None::<io::Error>);

        assert_eq!(same, sentinel);
        assert_eq!(same.reason(), "not found");
        assert_eq!(same.message(), "kept");
        assert!(same.cause().is_none());
        assert!(same.has_stack());
    }

    #[test]
    fn rewrapping_keeps_a_single_capture() {
        let once = not_found().wrap(io::Error::other("x"));
        let twice = once.wrap(io::Error::other("x"));
        assert_eq!(chain::stack_captures(&twice), 1);

        let nested = Error::new(500, "outer", Level::Error).wrap(once);
        assert!(!nested.has_stack());
        assert_eq!(chain::stack_captures(&nested), 1);
    }

    #[test]
    fn forks_leave_receiver_untouched() {
        let sentinel = not_found();

        let with_message = sentinel.with_message("user 7");
        let with_reason = sentinel.with_reason_fmt(format_args!("user {} not found", 7));
        let with_message_fmt = sentinel.with_message_fmt(format_args!("id={}", 7));

        assert_eq!(with_message.message(), "user 7");
        assert_eq!(with_reason.reason(), "user 7 not found");
        assert_eq!(with_message_fmt.message(), "id=7");
        assert_eq!(sentinel.reason(), "not found");
        assert!(sentinel.message().is_empty());
        assert_eq!(with_reason.level(), sentinel.level());
    }

    #[test]
    fn setters_mutate_in_place() {
        let mut err = Error::new(42, "ad hoc", Level::Warning);
        err.set_reason("changed")
            .set_message("details")
            .set_protocol_code(ProtocolCode::INVALID_ARGUMENT);

        assert_eq!(err.reason(), "changed");
        assert_eq!(err.message(), "details");
        assert_eq!(err.protocol_code(), ProtocolCode::INVALID_ARGUMENT);
        assert_eq!(err.code(), 42);
    }

    #[test]
    fn identity_ignores_reason_message_and_cause() {
        let a = not_found();
        let b = not_found().with_reason("gone").with_message("x").wrap(io::Error::other("y"));
        assert_eq!(a, b);

        let mut c = not_found();
        c.set_protocol_code(ProtocolCode::NOT_FOUND);
        assert_ne!(a, c);
    }

    #[test]
    fn display_includes_message_and_detail() {
        assert_eq!(not_found().to_string(), "code: 404, reason: not found");

        let err = not_found().with_message("user 7").wrap(io::Error::other("no rows"));
        assert_eq!(
            err.to_string(),
            "code: 404, reason: not found, message: user 7, detail: no rows"
        );
    }

    #[test]
    fn detail_falls_back_to_cause_text() {
        assert_eq!(not_found().detail(), "");
        assert_eq!(not_found().wrap(io::Error::other("no rows")).detail(), "no rows");
        assert_eq!(
            not_found().with_message("user 7").wrap(io::Error::other("no rows")).detail(),
            "user 7"
        );
    }

    #[test]
    fn source_exposes_cause() {
        let err = not_found().wrap(io::Error::other("no rows"));
        let source = StdError::source(&err).unwrap();
        assert!(source.downcast_ref::<io::Error>().is_some());
    }
}
