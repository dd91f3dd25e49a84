//! Tracing subscriber setup for binaries embedding Hudpixel.

use tracing_subscriber::EnvFilter;

use crate::HudpixelError;

/// Installs a `fmt` subscriber as the global default.
///
/// `RUST_LOG` wins when set; otherwise `default_directive` is used, e.g.
/// `"hudpixel_queue=debug,info"`.
///
/// # Errors
/// - [`HudpixelError::Logging`] if `default_directive` does not parse or
///   a global subscriber is already installed.
pub fn init(default_directive: &str) -> Result<(), HudpixelError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)
            .map_err(|e| HudpixelError::Logging(e.to_string()))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| HudpixelError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_an_error() {
        let _ = init("info");
        let second = init("info");
        assert!(matches!(second, Err(HudpixelError::Logging(_))));
    }
}
