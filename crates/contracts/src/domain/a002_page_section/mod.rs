//! Page section configuration: the persisted document, its save-time
//! validation, the storefront display payload and the admin-side
//! selection state.

pub mod aggregate;
pub mod display;
pub mod selection;
pub mod validation;

pub use aggregate::{
    EntryKind, PageSectionConfig, SaveSectionRequest, SaveSectionResponse, SectionEditorState,
    SectionEntry, SectionMeta, SetEnabledRequest,
};
pub use display::{DisplayCategory, DisplayPayload, DisplaySubcategory};
pub use selection::{
    BulkSelectOutcome, CategorySelection, MainSelection, SelectionRejection, SelectionRules,
    SelectionScope, SubSelection, SubcategoryStaging,
};
pub use validation::{
    validate_entries, SelectionLimits, ValidationError, ValidationRule, MAX_MAIN,
    MAX_SUB_PER_MAIN, MIN_MAIN,
};
