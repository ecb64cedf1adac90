//! Common type aliases used across the codebase.

use std::future::Future;
use std::pin::Pin;

/// A boxed, pinned, send-safe future.
///
/// Returned by the wallet, chain provider and market index traits so they
/// stay object-safe without the `async-trait` crate.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
