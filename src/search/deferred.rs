//! Lazy, single-shot asynchronous computations

use futures::future::{BoxFuture, FutureExt};
use std::fmt;
use std::future::{Future, IntoFuture};

type Thunk<T, E> = Box<dyn FnOnce() -> BoxFuture<'static, Result<T, E>> + Send>;

/// A computation that has not started yet.
///
/// Nothing happens when a `Deferred` is built or combined: the wrapped
/// closure is only called by [`Deferred::run`] (or by awaiting the value
/// directly). Success and failure travel on separate channels, `Ok(T)` and
/// `Err(E)`, and `E` is never rewrapped by this type.
#[must_use = "a Deferred does nothing until it is run or awaited"]
pub struct Deferred<T, E> {
    thunk: Thunk<T, E>,
}

impl<T, E> Deferred<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Wrap a closure producing the future to run. `f` is not called here.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            thunk: Box::new(move || f().boxed()),
        }
    }

    /// A computation that resolves with `value` when run
    pub fn resolved(value: T) -> Self {
        Self::new(move || async move { Ok(value) })
    }

    /// A computation that fails with `error` when run
    pub fn rejected(error: E) -> Self {
        Self::new(move || async move { Err(error) })
    }

    /// Execute the computation
    pub async fn run(self) -> Result<T, E> {
        (self.thunk)().await
    }

    /// Transform the success value once the computation has run
    pub fn map<U, F>(self, f: F) -> Deferred<U, E>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        Deferred::new(move || async move { self.run().await.map(f) })
    }

    /// Transform the failure value once the computation has run
    pub fn map_err<E2, F>(self, f: F) -> Deferred<T, E2>
    where
        E2: Send + 'static,
        F: FnOnce(E) -> E2 + Send + 'static,
    {
        Deferred::new(move || async move { self.run().await.map_err(f) })
    }

    /// Sequence another deferred computation after this one succeeds
    pub fn and_then<U, F>(self, f: F) -> Deferred<U, E>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Deferred<U, E> + Send + 'static,
    {
        Deferred::new(move || async move {
            let value = self.run().await?;
            f(value).run().await
        })
    }
}

impl<T, E> IntoFuture for Deferred<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = Result<T, E>;
    type IntoFuture = BoxFuture<'static, Result<T, E>>;

    fn into_future(self) -> Self::IntoFuture {
        (self.thunk)()
    }
}

impl<T, E> fmt::Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred { .. }")
    }
}
