pub mod booking;
pub mod desk;
pub mod rows;

pub use crate::domain::model::{Bid, Branch, Deal, DealStatus, DealSubmission, Table, UploadFile};
pub use crate::domain::ports::{BlobStore, RecordStore, Row, StoredBlob};
pub use crate::utils::error::Result;
