pub mod fields;
pub mod lead;
pub mod query;
pub mod status;

pub use fields::{Field, FieldSchema};
pub use lead::LeadRecord;
pub use query::{build_query, FilterKey, LeadsRequest, ListingControls, Page, SortKey};
pub use status::AcquisitionStatus;
