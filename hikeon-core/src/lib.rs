//! Core library for the HikeOn trail planner.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - An HTTP seam shared by every remote service
//! - Weather providers, Google geocoding/places lookups and the chatbot client
//! - UI-agnostic controllers, commands and a single-flight request guard
//!
//! It is used by `hikeon-cli`, but can also be driven by other front ends.

pub mod app;
pub mod chatbot;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod location;
pub mod model;
pub mod provider;
pub mod task;
pub mod weather;

pub use app::{App, Command, Dispatcher};
pub use chatbot::ChatbotService;
pub use config::{ApiKey, Config, ProviderConfig};
pub use controller::{ChatbotController, LocationController, WeatherController};
pub use error::ServiceError;
pub use http::{HttpClient, ReqwestHttpClient};
pub use location::LocationService;
pub use model::{GeoLocation, HikingSpot, SessionId, Weather};
pub use provider::{ProviderId, WeatherProvider};
pub use task::SingleFlight;
pub use weather::WeatherService;
