//! Core of the million chat client.
//!
//! - [`markdown::segment`] turns a (possibly partial) reply into an ordered block tree.
//!   It is a pure function of the text, so re-running it after every streamed fragment
//!   converges on the same tree as segmenting the finished reply.
//! - [`render::render_blocks`] lays a block tree out as width-bounded terminal lines,
//!   highlighting fenced code with syntect.
//! - [`config`] and [`logging`] carry the environment switches shared by the binaries.

pub mod config;
pub mod logging;
pub mod markdown;
pub mod render;

pub use crate::markdown::{segment, Block, Inline, ListKind};
pub use crate::render::{
    prewarm_code_highlighting, render_blocks, Line, Palette, RenderOptions, Span, Style,
};
