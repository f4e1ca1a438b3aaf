//! Helper functions for pages
//!
//! Date formatting, HTML escaping and URL generation shared by the
//! generator, the templates and the development server.

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
