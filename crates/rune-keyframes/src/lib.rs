#![allow(clippy::all)]
//! Index of the CSS keyframe animations defined across a document's stylesheets.
//!
//! [`AnimationRegistry`] scans every sheet (following `@import`) for
//! `@keyframes` and vendor-prefixed rules, then exposes each one as a
//! [`KeyframeAnimation`] whose steps can be looked up by selector and edited
//! through the live rule.

pub mod animation;
pub mod declarations;
pub mod diagnostics;
pub mod discovery;
pub mod error;
pub mod registry;
pub mod snapshot;
pub mod step;

pub use animation::{AnimationHandle, KeyframeAnimation};
pub use declarations::{DeclarationMap, declaration_map, parse_declarations, serialize_step};
pub use diagnostics::diagnostics_enabled;
pub use discovery::{Discovered, DiscoveryReport, SheetAccess, discover};
pub use error::{KeyframesError, Result};
pub use registry::{AnimationRegistry, AnimationTarget};
pub use snapshot::{AnimationSnapshot, RegistrySnapshot};
pub use step::KeyframeStep;
