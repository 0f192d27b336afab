//! Terminal output for billguard

mod ui;


pub use ui::{
    print_answer, print_error, print_ingestion_report, print_inspection, print_llm_probe,
    print_store_missing, render_answer, render_ingestion_report, render_inspection,
    render_llm_probe,
};

// Re-export core types
pub use billguard_core::{Error, Result};
