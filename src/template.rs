pub mod fetcher;

pub use fetcher::{fetch_template, TemplateFile};
