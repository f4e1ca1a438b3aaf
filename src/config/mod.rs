//! Configuration module

mod site;

pub use site::ApiConfig;
pub use site::ReadingConfig;
pub use site::SiteConfig;
pub use site::ACCESS_TOKEN_ENV;
