pub mod file;
pub mod parse;
