//! Run context - build once in main, pass everywhere
//!
//! ```text
//! main.rs:
//!   RunContext::new(&store, &oracle, &config) -> &RunContext
//!   |
//!   v
//! commands/publish.rs:
//!   fn run(ctx: &RunContext, request: &PublishRequest)
//! ```

use crate::approval::ApprovalOracle;
use crate::core::config::NotesConfig;
use crate::release::reconcile::Reconciler;
use crate::store::ReleaseStore;

/// Everything a run needs from the outside world
///
/// There is no global client: every store call and approval prompt goes
/// through the references held here.
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
  /// Tracker/registry (GitHub in production, in-memory in tests)
  pub store: &'a dyn ReleaseStore,

  /// Consulted before unpublishing a public release
  pub oracle: &'a dyn ApprovalOracle,

  pub config: &'a NotesConfig,

  /// Print plans instead of applying them
  pub dry_run: bool,
}

impl<'a> RunContext<'a> {
  pub fn new(store: &'a dyn ReleaseStore, oracle: &'a dyn ApprovalOracle, config: &'a NotesConfig) -> Self {
    Self {
      store,
      oracle,
      config,
      dry_run: false,
    }
  }

  pub fn with_dry_run(mut self, dry_run: bool) -> Self {
    self.dry_run = dry_run;
    self
  }

  /// Reconciler bound to this run's store and oracle
  pub fn reconciler(&self) -> Reconciler<'a> {
    Reconciler::new(self.store, self.oracle)
  }
}
