//! Runtime handles.
//!
//! Wraps Tokio's runtime primitives so that downstream crates never name Tokio
//! directly.

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs the provided future to completion on a fresh current-thread runtime.
///
/// Returns an error if the runtime cannot be built.
pub fn block_on<F>(future: F) -> std::io::Result<F::Output>
where
    F: std::future::Future,
{
    let runtime = Builder::new_current_thread().enable_all().build()?;
    Ok(runtime.block_on(future))
}

/// Returns `true` when called from inside a Tokio runtime.
pub fn in_runtime() -> bool {
    Handle::try_current().is_ok()
}
