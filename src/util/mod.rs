pub mod timestamp;

pub use timestamp::timestamp_now_ms;
