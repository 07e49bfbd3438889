//! Discovery and extraction of conversations from AI chat web apps, driven
//! entirely through a page-evaluate bridge into a live browser tab.

pub mod applescript;
pub mod discovery;
pub mod error;
pub mod evaluator;
pub mod extraction;
pub mod model;
pub mod navigator;
pub mod output;
pub mod profile;
pub mod provider;
pub mod registry;
pub mod render_json;
pub mod render_md;
pub mod signin;
pub mod slug;
pub mod timing;

pub use applescript::{AppleScriptEvaluator, BrowserApp};
pub use error::{HarvestError, Result};
pub use evaluator::{PageEvaluator, ScriptedEvaluator};
pub use model::{ConversationReference, ExtractionResult, HarvestOptions, Message, Role};
pub use output::{parse_formats, ExportWriter, OutputFormat};
pub use profile::SiteProfile;
pub use provider::{PageContext, Provider, SiteProvider};
pub use registry::Registry;
pub use timing::Timings;
