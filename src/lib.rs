//! Bulk-deletes completed GitHub Actions workflow runs of a repository.
//!
//! The work happens in three phases, each in [`transactions`]:
//!
//! 1. [`discover_workflows`](transactions::discover_workflows) resolves the target workflows.
//! 2. [`collect_all_run_ids`](transactions::collect_all_run_ids) pages through the completed runs of every workflow concurrently.
//! 3. [`delete_runs`](transactions::delete_runs) drains every collected run through a bounded worker pool.
//!
//! [`delete_workflow_runs`](transactions::delete_workflow_runs) chains them together.

#[cfg(feature = "cli")]
pub mod cli;
pub mod env;
pub mod framework;
pub mod transactions;
pub mod workflow;

/// A shorthand to define a statically allocated variable using a [`std::sync::LazyLock`].
///
/// # Examples
///
/// ```rust
/// use delete_workflow_runs::static_lazy_lock;
/// use std::sync::LazyLock;
///
/// static_lazy_lock! {
///     pub VAR_1: String = String::from("a static variable");
/// }
/// // ...equals to...
/// pub static VAR_2: LazyLock<String> = LazyLock::new(|| String::from("a static variable"));
/// ```
#[macro_export]
macro_rules! static_lazy_lock {
    ($(#[$meta:meta])* $vis:vis $name:ident: $type:ty = $expr:expr $(;)?) => {
        $(#[$meta])*
        $vis static $name: $crate::__priv_macro_use::LazyLock<$type> =
            $crate::__priv_macro_use::LazyLock::new(|| $expr);
    };
}

#[doc(hidden)]
pub mod __priv_macro_use {
    pub use std::sync::LazyLock;
}
