pub mod line_pricing;
pub mod request_token;
