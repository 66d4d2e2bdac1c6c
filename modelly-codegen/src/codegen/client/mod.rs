//! Angular / TypeScript renderers

mod components;
mod interface;
mod markup;
mod mat_table;
mod service;

pub use components::{render_component_css, render_component_spec, render_component_ts};
pub use interface::render_interface;
pub use markup::render_component_html;
pub use mat_table::{render_mat_table_html, render_mat_table_ts};
pub use service::{render_client_service, render_client_service_spec};
