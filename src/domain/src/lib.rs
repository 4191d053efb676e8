pub mod entities;
pub mod lexicon;
pub mod rules;
pub mod services;

pub use lexicon::{Category, Lexicon};
