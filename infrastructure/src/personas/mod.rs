//! Persona file loading
//!
//! Personas are TOML files, one per participant:
//!
//! ```toml
//! name = "VeganReviewer"
//! description = "Checks recipes for animal products"
//! instructions = """
//! You review recipes for vegans. Available: {{$ingredients}}
//! """
//!
//! [arguments]
//! ingredients = "Oats, Lentils"
//!
//! [execution_settings]
//! temperature = 0.4
//! ```

mod loader;

pub use loader::{PersonaLoadError, PersonaLoader};
