//! SVG card rendering.

mod icons;
pub mod svg;

pub use svg::{render_card, row_offsets, CardText, CARD_HEIGHT, CARD_WIDTH};
