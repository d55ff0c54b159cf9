//! Terminal rendering of segmented text.

mod blocks;
pub mod frame;
mod highlight;
mod palette;
mod wrap;

pub use blocks::{render_blocks, RenderOptions};
pub use frame::{Line, Rgb, Span, Style};
pub use highlight::{highlight_code, prewarm_code_highlighting};
pub use palette::Palette;
pub use wrap::{text_width, wrap_spans};
