//! Track identification.
//!
//! - [`scorer`] decides whether a candidate can be accepted unattended
//! - [`resolver`] asks the operator when it cannot
//! - [`prompt`] is the medium the resolver talks through
//! - [`pipeline`] ties them to the catalog for one file

pub mod pipeline;
pub mod prompt;
pub mod resolver;
pub mod scorer;

pub use pipeline::TrackResolutionPipeline;
pub use prompt::{Prompter, ScriptedPrompter, TerminalPrompter};
pub use resolver::DisambiguationResolver;
