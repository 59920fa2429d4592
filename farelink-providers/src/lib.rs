pub mod amadeus;
pub mod app_config;
pub mod razorpay;
pub mod serpapi;

pub use amadeus::AmadeusClient;
pub use app_config::Config;
pub use razorpay::RazorpayClient;
pub use serpapi::SerpApiClient;
