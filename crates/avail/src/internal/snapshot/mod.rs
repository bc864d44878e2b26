pub mod entity;
pub mod model;
pub mod placement;
pub mod state;
pub mod time;
pub mod value;
