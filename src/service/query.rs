// src/service/query.rs
//! Query rendering for the service registry.
//!
//! The registry speaks a small WQL-flavored query language. Every value
//! interpolated into a query passes through [`escape_value`], so a service
//! name containing the string delimiter cannot change the query shape.

/// Escape the single-quote string delimiter inside an interpolated value.
pub fn escape_value(value: &str) -> String {
    value.replace('\'', "\\'")
}

/// Reverse of [`escape_value`], for registries that interpret rendered
/// queries in-process.
pub fn unescape_value(value: &str) -> String {
    value.replace("\\'", "'")
}

/// The query shapes the directory emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceQuery {
    /// Every registered service.
    All,
    /// Services whose name contains the fragment.
    NameContains(String),
    /// The service with exactly this name.
    NameEquals(String),
}

impl ServiceQuery {
    /// Render the query string handed to the registry.
    pub fn render(&self) -> String {
        match self {
            Self::All => "SELECT * FROM Win32_Service".to_string(),
            Self::NameContains(fragment) => format!(
                "SELECT * FROM Win32_Service WHERE Name LIKE '%{}%'",
                escape_value(fragment)
            ),
            Self::NameEquals(name) => format!(
                "SELECT * FROM Win32_Service WHERE Name='{}'",
                escape_value(name)
            ),
        }
    }
}
