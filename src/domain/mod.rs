pub mod model;
pub mod points;
pub mod tasks;
