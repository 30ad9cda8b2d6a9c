use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Builds the log filter. An explicit `filter` wins over `RUST_LOG` and must
/// parse; a bad `RUST_LOG` or no setting at all falls back to `info`.
pub fn build_filter(filter: Option<&str>) -> Result<EnvFilter, ParseError> {
    match filter {
        Some(directives) => EnvFilter::try_new(directives),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))),
    }
}

/// Installs the global subscriber.
pub fn init_tracing(json_logs: bool, filter: Option<&str>) -> Result<(), ParseError> {
    let filter = build_filter(filter)?;

    let fmt_layer = {
        let base = fmt::layer().with_target(true).with_writer(std::io::stderr);
        if json_logs {
            base.json().with_current_span(true).boxed()
        } else {
            base.boxed()
        }
    };

    Registry::default().with(filter).with(fmt_layer).init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_directives_are_accepted() {
        let filter = build_filter(Some("info,sale_harness=debug")).unwrap();
        assert!(filter.to_string().contains("sale_harness=debug"));
    }

    #[test]
    fn malformed_directive_is_rejected() {
        assert!(build_filter(Some("sale_harness=loud")).is_err());
    }
}
