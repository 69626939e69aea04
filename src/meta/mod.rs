//! Readers for the acquisition's side-channel metadata files: the YAML
//! channel map and the CSV cell line layout.

mod channels;
mod layout;

pub use channels::{discover_channels_meta, find_channels_meta, ChannelEntry, ChannelMap};
pub use layout::{load_cell_line_layout, LayoutEntry, PlateLayout};
