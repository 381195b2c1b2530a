//! CSS selector contract with the destination page
//!
//! Version-coupled: these track the host application's current markup and
//! break silently when it ships a redesign. Keep them in one place.

/// Destination page the workflow automates
pub const DESTINATION_URL: &str = "https://notebooklm.google.com/";

/// Brand suffix kept last in the tab title so tabs group by source
pub const TITLE_SUFFIX: &str = "NotebookLM";

/// The "+ Add source" control, only when actionable
pub const ADD_SOURCE_BUTTON: &str = "button:not([disabled]).create-new-button";

/// Source-type chip for a website/URL import
pub const WEBSITE_CHIP: &str = "#mat-mdc-chip-2";

/// Source-type chip for a pasted-text import
pub const TEXT_CHIP: &str = "#mat-mdc-chip-4";

/// URL entry field in the add-source dialog
pub const URL_INPUT: &str = "textarea[formcontrolname=\"newUrl\"]";

/// Content entry field for a pasted-text source
pub const TEXT_INPUT: &str = "textarea[formcontrolname=\"text\"]";

/// Submit control for the URL import dialog
pub const IMPORT_SUBMIT: &str = "button:not([disabled]).submit-button";

/// Submit control for the pasted-text dialog
pub const TEXT_IMPORT_SUBMIT: &str =
    "form[name=\"pasted-text-form\"] button:not([disabled]).submit-button";

/// Prompt entry surface shown once the notebook is ready
pub const PROMPT_INPUT: &str = "textarea.query-box-input";

/// Prompt submit control, only when actionable
pub const PROMPT_SUBMIT: &str = "button:not([disabled]).submit-button";

/// Transient indicator shown while a summary is being generated
pub const GENERATION_INDICATOR: &str = ".thinking-indicator";

/// Notebook title heading, renamed by the host after an import registers
pub const NOTEBOOK_TITLE: &str = ".notebook-title";
