//! Logging macros that forward to `defmt` on the target.
//!
//! On ARM the macros expand to `defmt::{debug,info,warn}!`. On the host (tests)
//! they only borrow their arguments, so no defmt global logger has to be linked.
//!
//! # Usage
//!
//! ```ignore
//! log_info!("cpu_hz set to {}", hz);
//! log_warn!("record dropped, store full ({})", count);
//! ```

#[cfg(target_arch = "arm")]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        defmt::debug!($($arg)*)
    };
}

#[cfg(target_arch = "arm")]
macro_rules! log_info {
    ($($arg:tt)*) => {
        defmt::info!($($arg)*)
    };
}

#[cfg(target_arch = "arm")]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        defmt::warn!($($arg)*)
    };
}

#[cfg(not(target_arch = "arm"))]
macro_rules! log_debug {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        $( let _ = &$arg; )*
    }};
}

#[cfg(not(target_arch = "arm"))]
macro_rules! log_info {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        $( let _ = &$arg; )*
    }};
}

#[cfg(not(target_arch = "arm"))]
macro_rules! log_warn {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        $( let _ = &$arg; )*
    }};
}
