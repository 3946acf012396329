mod conversions;
mod types;

pub use types::{AdminAccessAuditEventResponse, AdminAuditEventsQuery, AdminReadQuery};
