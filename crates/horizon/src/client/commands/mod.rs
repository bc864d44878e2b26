pub mod available;
pub mod classes;
