pub mod input;
pub mod io;
