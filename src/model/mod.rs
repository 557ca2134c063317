pub mod classifier;
pub mod labels;
pub mod layers;
pub mod network;
pub mod trees;
