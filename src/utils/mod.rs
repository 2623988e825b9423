//! Utility modules supporting search and download.
//!
//! - [`RangeSpec`]: compact range expressions (`"3,7-9"`) for year filters and download selection
//! - [`FilenameTemplate`] and [`slugify`]: filesystem-safe file names from entry metadata
//! - [`has_pdf_signature`]: content check for downloaded files
//! - [`HttpClient`]: shared reqwest client
//!
//! # Filename templates
//!
//! ```rust
//! use arxiv_paper::utils::{slugify, FilenameTemplate, TemplateFields};
//!
//! let template = FilenameTemplate::parse("{pub}-{title}").unwrap();
//! let fields = TemplateFields {
//!     title_slug: slugify("Quantum Stuff"),
//!     publish_year: "2023".to_string(),
//!     ..Default::default()
//! };
//! assert_eq!(template.render(&fields), "2023-Quantum_Stuff");
//! ```

mod http;
mod pdf;
mod range;
mod template;

pub use http::{HttpClient, DEFAULT_USER_AGENT};
pub use pdf::{has_pdf_signature, is_pdf_signature, PDF_MAGIC};
pub use range::{RangeError, RangeSpec, RangeTerm};
pub use template::{slugify, FilenameTemplate, TemplateError, TemplateFields, DEFAULT_TEMPLATE};
