//! # annoview
//!
//! Client-side logic of NLP annotation demo pages, without the page.
//!
//! - **Selection**: annotators with dependency constraints. Selecting one
//!   locks what it requires; deselecting releases what nobody needs anymore.
//! - **Overlay**: offset-tagged descriptions spliced into sentence text as
//!   inline markers, applied highest offset first so no offset goes stale.
//! - **Payload**: the analysis response model and the gauge and histogram
//!   numbers derived from its statistics.
//!
//! ## Selection
//!
//! ```rust
//! use annoview::selection::{Item, SelectionGroup};
//!
//! let mut group = SelectionGroup::new(vec![
//!     Item::with_requires_csv("tokenize", ""),
//!     Item::with_requires_csv("pos", "tokenize"),
//!     Item::with_requires_csv("ner", "tokenize,pos"),
//! ])?;
//!
//! group.toggle("ner")?;
//! assert!(group.get("pos").unwrap().is_locked());
//!
//! group.toggle("ner")?;
//! assert_eq!(group.selected_count(), 0);
//! # Ok::<(), annoview::Error>(())
//! ```
//!
//! ## Overlay
//!
//! ```rust
//! use annoview::overlay::{render_segment, strip_markers, Segment, Span};
//!
//! let segment = Segment::new("Il gatto dorme.", 0);
//! let html = render_segment(&segment, &[Span::new(3, 8, "gatto", "animale")])?;
//!
//! assert!(html.contains(r#"id="form3">gatto</a>"#));
//! assert_eq!(strip_markers(&html), segment.text);
//! # Ok::<(), annoview::Error>(())
//! ```
//!
//! ## Errors
//!
//! Every fallible operation returns [`Result`]. Nothing is retried and no
//! error affects later, independent operations. Degraded conditions
//! (unresolved references, skipped overlapping spans) are reported through
//! the `log` facade.

#![warn(missing_docs)]

pub mod catalog;
pub mod config;
mod error;
pub mod offset;
pub mod overlay;
pub mod payload;
pub mod selection;

#[cfg(feature = "cli")]
pub mod cli;

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    //!
    //! ```rust
    //! use annoview::prelude::*;
    //!
    //! let overlay = Overlay::new(OverlayConfig::default());
    //! let html = overlay.render_segment(&Segment::new("abc", 0), &[]).unwrap();
    //! assert_eq!(html, "abc");
    //! ```
    pub use crate::catalog::{Catalog, InitialSelection};
    pub use crate::config::{
        Config, MarkerStyle, OffsetUnit, OverlapPolicy, OverlayConfig, SelectionConfig,
        UnresolvedPolicy,
    };
    pub use crate::error::{Error, Result};
    pub use crate::overlay::{render_segment, strip_markers, Overlay, RenderedSentence, Segment, Span};
    pub use crate::payload::{AnalysisResponse, Description, Sentence, Statistics};
    pub use crate::selection::{Item, SelectionGroup};
}

// Re-exports
pub use catalog::Catalog;
pub use config::Config;
pub use error::{Error, Result};
pub use overlay::{render_segment, Overlay, Segment, Span};
pub use payload::AnalysisResponse;
pub use selection::{Item, SelectionGroup};
