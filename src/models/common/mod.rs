pub mod error_code;
pub mod pagination;
pub mod response;

pub use error_code::ErrorCode;
pub use pagination::{
    PaginationInfo, PaginationQuery, deserialize_optional_bool,
    deserialize_optional_i64,
};
pub use response::ApiResponse;
