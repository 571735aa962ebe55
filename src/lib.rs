#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod color;
pub mod command;
pub mod config;
pub mod error;
pub mod file_handler;
pub mod file_io;
pub mod input;
pub mod layer;
pub mod palette;
pub mod panels;
pub mod pixel_buffer;
pub mod renderer;
pub mod state;
pub mod tools;

pub use app::PaintApp;
pub use color::Color;
pub use command::{Command, HistoryManager};
pub use config::EditorConfig;
pub use error::{CanvasError, CanvasResult};
pub use input::{InputEvent, InputLocation};
pub use layer::{Layer, LayerId, LayerStack};
pub use pixel_buffer::{PixelBuffer, ResizePolicy};
pub use renderer::Renderer;
pub use state::EditorState;
pub use tools::{PixelPos, Tool, ToolType};
