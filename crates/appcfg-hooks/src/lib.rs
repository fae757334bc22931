//! Build-pipeline hooks.
//!
//! [`BuildHooks`] is the single context object a host build pipeline talks
//! to. Before a build it refreshes the config index, resolves the config for
//! the target's application identifier and, on a mismatch, asks the operator
//! through a [`Prompter`]. After a build it opens the generated artifacts,
//! runs every registered feature patch and saves each artifact once.
//!
//! ```ignore
//! let mut hooks = BuildHooks::open("/path/to/project")?;
//! let changes = hooks.asset_changes();
//! // file watcher thread: changes.notify(paths);
//! hooks.on_tick();
//! hooks.pre_build(BuildTarget::Ios, &mut identity, &mut TerminalPrompter::new())?;
//! hooks.post_build_ios(&native_project, &identity, &settings)?;
//! ```

pub mod adapter;
pub mod disambiguator;
pub mod error;
pub mod features;
pub mod identity;
pub mod logging;
pub mod notifier;

pub use adapter::{ArtifactFailure, BuildHooks, PostBuildReport, PreBuildReport};
pub use disambiguator::{
    InteractiveDisambiguator, PromptOutcome, PromptRequest, PromptStatus, Prompter, SpamGuard,
    TerminalPrompter,
};
pub use error::{Error, Result};
pub use identity::{ApplicationIdentity, BuildTarget, StaticIdentity};
pub use notifier::{AssetChangeHandle, AssetChangeNotifier};
