pub mod ring_buffer;
pub mod stats;

pub use ring_buffer::RingBuffer;
pub use stats::{clamp01, mean, std_dev};
