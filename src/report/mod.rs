pub mod cloud;
pub mod csv;
