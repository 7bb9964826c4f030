//! Workspace Models
//!
//! Typed views over the workspace service's JSON objects (databases, pages,
//! property envelopes) and the experiment-tracking vocabulary mapped onto them:
//! logical param/metric types, run status, and the run schema.

pub mod database;
pub mod field_type;
pub mod metric_history;
pub mod page;
pub mod property;
pub mod run_schema;
pub mod status;

pub use database::{DatabaseInfo, RichTextSegment};
pub use field_type::{metric_field_type, param_field_type, FieldType, MetricType, ParamType};
pub use metric_history::{MetricHistory, MetricPoint};
pub use page::{PageInfo, Parent};
pub use property::{FileRef, ParamValue, PropertyUpdate, SelectColor, SelectOption};
pub use run_schema::{params_key, metrics_key, ColumnSpec, RunSchema};
pub use status::PageStatus;
