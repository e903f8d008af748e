pub mod assertions;
pub mod fixtures;
