pub mod clock;
pub mod random;

pub use clock::{Clock, ManualClock, SystemClock};
pub use random::{credential_id, FixedRandomSource, RandomSource, ThreadRngSource};
