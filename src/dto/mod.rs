pub mod api_dto;
pub mod telegram_dto;
