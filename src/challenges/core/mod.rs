//! Core utilities shared by the puzzle parsers, solvers, and submitters.

pub mod analysis;
pub mod executor;
pub mod image_repair;
pub mod reqwest_client;
pub mod session;
pub mod stream;
pub mod types;

pub use analysis::{ChallengeParseError, capture_token, parse_token, payload_text};
pub use executor::{ChallengeHttpClient, ChallengeHttpResponse, TransportError, execute_request};
pub use image_repair::{FinderLayout, repair_finder_patterns, repair_in_place};
pub use reqwest_client::ReqwestChallengeHttpClient;
pub use session::{CookieJar, ReplayableSession};
pub use stream::{DEFAULT_READ_BUFFER, LineConnection};
pub use types::ChallengeRequest;
