//! String catalogs (`.xcstrings`) and the operations on them.

pub mod augment;
pub mod format;
pub mod formatter;
pub mod prune;
pub mod table;

pub use augment::{AugmentOptions, AugmentReport, augment};
pub use format::{Catalog, ExtractionState, Item, Localization, StringUnit, TranslationState};
pub use prune::{PruneReport, prune_unreferenced};
pub use table::TranslationTable;
