pub mod init_cell;

pub use init_cell::{InitCell, InitError, InitState};
