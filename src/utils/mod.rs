mod ring_buffer;
pub use ring_buffer::{GROWTH_FACTOR, RingBuffer};
