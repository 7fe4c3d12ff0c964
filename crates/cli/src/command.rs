//! Command trait for hookscope CLI
//!
//! Every subcommand implements [`Command`] and receives the shared
//! [`RuntimeContext`]. Commands return their result as well as printing it,
//! so tests can inspect what a run produced.

use crate::common::RuntimeContext;
use crate::error::Result;

/// A subcommand run against the loaded configuration
///
/// ```rust,ignore
/// #[derive(Debug, Args)]
/// pub struct CountCommand;
///
/// impl Command for CountCommand {
///     type Output = usize;
///
///     fn execute(&self, context: &RuntimeContext) -> Result<usize> {
///         let catalog = VersionCatalog::fetch(&context.config.source);
///         println!("{}", catalog.len());
///         Ok(catalog.len())
///     }
/// }
/// ```
pub trait Command {
    /// What a successful run yields (the report for `scan`, versions for `versions`)
    type Output;

    /// Run with the given context
    ///
    /// # Errors
    ///
    /// Fails with [`crate::error::CommandError::NoVersions`] when there is
    /// nothing to work on, or with the underlying error otherwise.
    fn execute(&self, context: &RuntimeContext) -> Result<Self::Output>;
}
