#![allow(dead_code)]

pub mod builders;
pub mod mock_archive;
pub mod mock_installer;
pub mod strategies;

pub use builders::*;
pub use mock_archive::*;
pub use mock_installer::*;
