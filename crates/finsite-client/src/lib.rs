pub mod client_ext;
pub mod www;

pub use crate::client_ext::{Backend, BackendExt, FetchError};
pub use crate::www::IndicatorQuery;
