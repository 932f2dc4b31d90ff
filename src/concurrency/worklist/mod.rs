//! The work-stealing storage behind [`crate::work_queue::WorkQueue`]:
//! segmented unrolled linked lists, one [`segment::BagSegment`] per worker
//! thread, collected into a [`bag::Bag`] per locale.

pub mod bag;
pub mod block;
pub mod segment;

pub use bag::Bag;
pub use block::BagSegmentBlock;
pub use segment::{BagSegment, SegmentStatus};
