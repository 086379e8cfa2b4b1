//! Setlist voting widget: a swipeable song carousel whose card background is
//! tinted with a color sampled from each song's cover art.

pub mod carousel;
pub mod catalog;
pub mod cli;
pub mod color;
pub mod logging;
pub mod sampler;
pub mod tui;
