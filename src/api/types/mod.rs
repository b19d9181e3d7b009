//! API request, response and error types

pub mod chat;
pub mod error;
pub mod json;

pub use chat::{
    ChatRequest, ChatResponse, ConfigureRequest, HistoryResponse, MessageDto, ModelsResponse,
    StatusResponse,
};
pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
