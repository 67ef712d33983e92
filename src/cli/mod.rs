pub mod autofill;
pub mod detail;
pub mod periods;
pub mod setup;
pub mod ui;
