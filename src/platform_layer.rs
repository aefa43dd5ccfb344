/*
 * The presentation layer. `types` holds the actions and dialog seam shared
 * with the application logic; `console` is the line-oriented front end used
 * by the binary.
 */
pub mod console;
pub mod types;

pub use types::{DialogOperations, UserAction};
