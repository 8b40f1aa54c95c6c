pub mod lines;
pub mod mesh;
