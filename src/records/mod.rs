//! Student records from the collaborating services, merged into one view.

pub mod aggregator;
pub mod http;
pub mod model;
pub mod source;

pub use aggregator::{
    GapReason, RecordGap, RecordKind, StudentRecordAggregator, StudentViewModel, NOT_AVAILABLE,
};
pub use http::HttpStudentRecords;
pub use source::{InMemoryStudentRecords, RecordSourceError, StudentRecordSource};
