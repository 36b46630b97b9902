pub mod error_codes; // 统一错误代码标准

pub use error_codes::ErrorCode;
