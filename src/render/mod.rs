//! DANFE page rendering.

mod barcode;
mod danfe;
mod layout;
mod options;

pub use barcode::encode_access_key;
pub use danfe::{render_danfe, DanfeRenderer, RenderedDanfe};
pub use layout::{Canvas, Cursor, HAlign};
pub use options::{OverflowPolicy, RenderOptions};
