pub mod allocator;
pub mod dedicated;
pub mod equivalence;
pub mod projector;
