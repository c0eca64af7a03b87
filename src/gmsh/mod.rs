pub mod parser;

pub use parser::{read_msh, read_msh_file};
