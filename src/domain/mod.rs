pub mod ai;
pub mod entity;
pub mod grid;
pub mod growth;
pub mod physics;
pub mod registry;
pub mod rules;
pub mod tile;
