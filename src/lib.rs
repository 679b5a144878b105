#[macro_use]
extern crate lazy_static;

pub mod errors;
pub use errors::{LandingError, Result};

pub mod app;
pub mod config;
pub mod cookies;
pub mod history;
pub mod identity;
pub mod links;
pub mod page;
pub mod platform;
pub mod profile;
pub mod session;
pub mod view;

pub use app::Landing;
pub use config::LandingConfig;
pub use cookies::{Cookie, CookieJar, FileJar, MemoryJar};
pub use history::{History, MemoryHistory};
pub use identity::{Identity, IdentityStore};
pub use links::{ActionLink, LinkRegistry, REGISTRY};
pub use page::Page;
pub use platform::Platform;
pub use profile::{Endpoints, HttpProfileClient, Profile, ProfileClient};
pub use session::{SessionResolver, SubmitOutcome, ViewState};
pub use view::{Action, Container, Control, ViewController, ViewSurface};

use std::sync::Once;

pub static INIT: Once = Once::new();

pub const USER_ID_COOKIE: &str = "UserID";
pub const NAME_COOKIE: &str = "Name";
/// Ten years, in seconds.
pub const COOKIE_MAX_AGE: u64 = 60 * 60 * 24 * 365 * 10;

pub const DEFAULT_INTENT_SCHEME: &str = "happ://add/";
pub const API_URL_ENV: &str = "LANDING_API_URL";

pub fn initialize() {
    INIT.call_once(|| {
        let _ = env_logger::try_init();
        log::info!("Initializing landing");
    });
}
