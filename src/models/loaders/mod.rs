pub mod toml_loader;

pub use toml_loader::{load_catalog, load_embedded_catalog, parse_alphabets, parse_lessons};
