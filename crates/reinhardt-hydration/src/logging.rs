//! Logging abstraction layer for reinhardt-hydration
//!
//! The macros log through the browser console on WASM and through `tracing`
//! on native targets, so the runtime logs the same way in the browser and in
//! tests.
//!
//! ## Macro Overview
//!
//! | Macro | WASM (debug build) | WASM (release) | Non-WASM |
//! |-------|--------------------|----------------|----------|
//! | `debug_log!` | `console.debug` | no-op | `tracing::debug!` |
//! | `info_log!` | `console.info` | no-op | `tracing::info!` |
//! | `warn_log!` | `console.warn` | no-op | `tracing::warn!` |
//! | `error_log!` | `console.error` | `console.error` | `tracing::error!` |
//!
//! `debug_log!` is unconditional here; the runtime only calls it while its
//! debug flag is set (see [`HydrationRuntime::set_debug`](crate::HydrationRuntime::set_debug)).
//!
//! ## Example
//!
//! ```ignore
//! use reinhardt_hydration::{debug_log, info_log, warn_log, error_log};
//!
//! debug_log!("scanning {} islands", count);
//! info_log!("island {} hydrated", id);
//! warn_log!("invalid props payload on {}", id);
//! error_log!("component {} failed: {}", name, error);
//! ```

/// Logs a debug message.
#[macro_export]
#[cfg(all(debug_assertions, target_arch = "wasm32"))]
macro_rules! debug_log {
	($($arg:tt)*) => {{
		$crate::__private::web_sys::console::debug_1(&format!($($arg)*).into());
	}};
}

/// No-op debug_log in release WASM builds
#[macro_export]
#[cfg(all(not(debug_assertions), target_arch = "wasm32"))]
macro_rules! debug_log {
	($($arg:tt)*) => {{
		let _ = format_args!($($arg)*);
	}};
}

/// Logs a debug message.
#[macro_export]
#[cfg(not(target_arch = "wasm32"))]
macro_rules! debug_log {
	($($arg:tt)*) => {{
		$crate::__private::tracing::debug!("{}", format!($($arg)*));
	}};
}

/// Logs an info message.
#[macro_export]
#[cfg(all(debug_assertions, target_arch = "wasm32"))]
macro_rules! info_log {
	($($arg:tt)*) => {{
		$crate::__private::web_sys::console::info_1(&format!($($arg)*).into());
	}};
}

/// No-op info_log in release WASM builds
#[macro_export]
#[cfg(all(not(debug_assertions), target_arch = "wasm32"))]
macro_rules! info_log {
	($($arg:tt)*) => {{
		let _ = format_args!($($arg)*);
	}};
}

/// Logs an info message.
#[macro_export]
#[cfg(not(target_arch = "wasm32"))]
macro_rules! info_log {
	($($arg:tt)*) => {{
		$crate::__private::tracing::info!("{}", format!($($arg)*));
	}};
}

/// Logs a warning message.
#[macro_export]
#[cfg(all(debug_assertions, target_arch = "wasm32"))]
macro_rules! warn_log {
	($($arg:tt)*) => {{
		$crate::__private::web_sys::console::warn_1(&format!($($arg)*).into());
	}};
}

/// No-op warn_log in release WASM builds
#[macro_export]
#[cfg(all(not(debug_assertions), target_arch = "wasm32"))]
macro_rules! warn_log {
	($($arg:tt)*) => {{
		let _ = format_args!($($arg)*);
	}};
}

/// Logs a warning message.
#[macro_export]
#[cfg(not(target_arch = "wasm32"))]
macro_rules! warn_log {
	($($arg:tt)*) => {{
		$crate::__private::tracing::warn!("{}", format!($($arg)*));
	}};
}

/// Logs an error message.
///
/// Errors reach the console in release builds too, since a failed island is
/// visible to the user.
#[macro_export]
#[cfg(target_arch = "wasm32")]
macro_rules! error_log {
	($($arg:tt)*) => {{
		$crate::__private::web_sys::console::error_1(&format!($($arg)*).into());
	}};
}

/// Logs an error message.
#[macro_export]
#[cfg(not(target_arch = "wasm32"))]
macro_rules! error_log {
	($($arg:tt)*) => {{
		$crate::__private::tracing::error!("{}", format!($($arg)*));
	}};
}
