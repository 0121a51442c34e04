//! Logging shims.
//! Forwards to `tracing` when the feature is on. Otherwise the arguments are only
//! type-checked and nothing is logged.

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, info, warn as warning};

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($t: tt)*) => {{
        let _ = format_args!($($t)*);
    }};
}

#[cfg(not(feature = "tracing"))]
macro_rules! info {
    ($($t: tt)*) => {{
        let _ = format_args!($($t)*);
    }};
}

// Not `warn`, which would clash with the built-in lint attribute.
#[cfg(not(feature = "tracing"))]
macro_rules! warning {
    ($($t: tt)*) => {{
        let _ = format_args!($($t)*);
    }};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use {debug, info, warning};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shims_accept_format_arguments() {
        let reason = 1;

        debug!("Deactivated, reason: {}", reason);
        info!("Emulation started");
        warning!("{:?}", Some(reason));
    }
}
