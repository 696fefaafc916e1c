pub mod popup;

pub use popup::{centered_rect, render_popup_with_block};
