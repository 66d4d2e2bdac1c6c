//! C# / ASP.NET Core renderers

mod access;
mod config;
mod controller;
mod entity;
mod service;

pub use access::render_access;
pub use config::render_config;
pub use controller::render_controller;
pub use entity::render_entity;
pub use service::{render_service_class, render_service_interface};

/// Quote text as a C# string literal
pub(crate) fn csharp_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csharp_string() {
        assert_eq!(csharp_string("SELECT * FROM [Users]"), "\"SELECT * FROM [Users]\"");
        assert_eq!(csharp_string(r#"a"b\c"#), r#""a\"b\\c""#);
    }
}
