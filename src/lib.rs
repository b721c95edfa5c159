pub mod backend;
pub mod camera;
pub mod editor;
pub mod engine;
pub mod menubar;
pub mod pipeline;
pub mod renderer;
pub mod types;
