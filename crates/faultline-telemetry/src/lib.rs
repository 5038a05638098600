//! Logging for faultline
//!
//! Sets up the `tracing` subscriber and bridges structured errors into it,
//! choosing the log level from the error's own severity.

use std::error::Error as StdError;

use faultline_config::{LogFormat, TelemetryConfig};
use faultline_core::{Level, chain};

/// Guard returned by [`init`]; hold it for the lifetime of the application
pub struct TelemetryGuard {
    service_name: String,
}

impl TelemetryGuard {
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::debug!(service = %self.service_name, "telemetry shutting down");
    }
}

/// Initialize logging from configuration
///
/// Without a telemetry section, JSON logs filtered at `info` are written to
/// stdout. `RUST_LOG`, when set, replaces the configured filter.
///
/// # Errors
///
/// Returns an error if the filter directive is invalid or a global
/// subscriber is already installed
pub fn init(config: Option<&TelemetryConfig>) -> anyhow::Result<TelemetryGuard> {
    use tracing_subscriber::{EnvFilter, Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let defaults = TelemetryConfig::default();
    let config = config.unwrap_or(&defaults);

    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.is_empty() => EnvFilter::try_new(&directives)
            .map_err(|e| anyhow::anyhow!("invalid {} directive '{directives}': {e}", EnvFilter::DEFAULT_ENV))?,
        _ => EnvFilter::try_new(&config.log_filter)
            .map_err(|e| anyhow::anyhow!("invalid log filter '{}': {e}", config.log_filter))?,
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_filter(filter)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .with_filter(filter)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    tracing::info!(service = %config.service_name, format = ?config.format, "telemetry initialized");

    Ok(TelemetryGuard {
        service_name: config.service_name.clone(),
    })
}

/// `tracing` level an error of severity `level` is logged at
pub const fn to_tracing_level(level: Level) -> tracing::Level {
    match level {
        Level::Debug => tracing::Level::DEBUG,
        Level::Info => tracing::Level::INFO,
        Level::Warning => tracing::Level::WARN,
        Level::Error | Level::Critical => tracing::Level::ERROR,
    }
}

/// Log `err` at the level its outermost layer asks for
///
/// Errors that carry no severity are logged at `default_level`. Code and
/// reason come from the first structured value in the chain, if any.
pub fn record_error(err: &(dyn StdError + 'static), default_level: Level, message: &str) {
    let severity = chain::severity_of(err, default_level);
    let value = chain::find_error(err);

    let code = value.map(faultline_core::Error::code);
    let reason = value.map(faultline_core::Error::reason);
    let detail = value.map(faultline_core::Error::detail);
    let detail = detail.as_deref().filter(|d| !d.is_empty());
    let critical = severity == Level::Critical;
    let stack = chain::iter(err)
        .filter_map(chain::as_error)
        .find_map(faultline_core::Error::stack_trace)
        .filter(|_| severity >= Level::Error)
        .map(tracing::field::display);

    macro_rules! emit {
        ($level:expr) => {
            tracing::event!(
                $level,
                code,
                reason,
                detail,
                severity = %severity,
                critical,
                stack,
                error = %err,
                "{message}"
            )
        };
    }

    // keep in step with `to_tracing_level`
    match severity {
        Level::Debug => emit!(tracing::Level::DEBUG),
        Level::Info => emit!(tracing::Level::INFO),
        Level::Warning => emit!(tracing::Level::WARN),
        Level::Error | Level::Critical => emit!(tracing::Level::ERROR),
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use faultline_core::Error;
    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    /// Collects formatted log output in memory
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::TRACE)
            .with_writer(captured.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, f);
        captured.contents()
    }

    #[test]
    fn maps_every_severity() {
        assert_eq!(to_tracing_level(Level::Debug), tracing::Level::DEBUG);
        assert_eq!(to_tracing_level(Level::Info), tracing::Level::INFO);
        assert_eq!(to_tracing_level(Level::Warning), tracing::Level::WARN);
        assert_eq!(to_tracing_level(Level::Error), tracing::Level::ERROR);
        assert_eq!(to_tracing_level(Level::Critical), tracing::Level::ERROR);
    }

    #[test]
    fn business_fault_logs_at_its_own_level() {
        let err = Error::new(20300, "resource not found", Level::Info).with_message("order 9");
        let output = capture(|| record_error(&err, Level::Error, "request failed"));

        assert!(output.contains(r#""level":"INFO""#), "{output}");
        assert!(output.contains(r#""code":20300"#), "{output}");
        assert!(output.contains(r#""reason":"resource not found""#), "{output}");
        assert!(output.contains(r#""detail":"order 9""#), "{output}");
        assert!(output.contains(r#""critical":false"#), "{output}");
    }

    #[test]
    fn wrapped_cause_becomes_detail() {
        let err = Error::new(11001, "database error", Level::Error).wrap(io::Error::other("connection reset"));
        let output = capture(|| record_error(&err, Level::Error, "request failed"));

        assert!(output.contains(r#""detail":"connection reset""#), "{output}");
    }

    #[test]
    fn critical_logs_at_error_with_flag() {
        let err = Error::new(10000, "unknown", Level::Critical);
        let output = capture(|| record_error(&err, Level::Info, "request failed"));

        assert!(output.contains(r#""level":"ERROR""#), "{output}");
        assert!(output.contains(r#""critical":true"#), "{output}");
        assert!(output.contains(r#""severity":"critical""#), "{output}");
    }

    #[test]
    fn foreign_error_uses_default_level() {
        let err = io::Error::other("disk on fire");
        let output = capture(|| record_error(&err, Level::Warning, "background job failed"));

        assert!(output.contains(r#""level":"WARN""#), "{output}");
        assert!(output.contains("disk on fire"), "{output}");
        assert!(!output.contains(r#""code""#), "{output}");
    }
}
