pub mod control; // Lock-free parameter messages
pub mod dsp;
pub mod graph; // Composable block-based nodes
pub mod patch; // Serializable descriptors

pub const MAX_BLOCK_SIZE: usize = 2048;
