pub mod face;
pub mod frame;
pub mod layout;
