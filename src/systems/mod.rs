pub mod assets;
pub mod camera;
pub mod engine;
pub mod planet;
pub mod tick;
