//! Mock login, session cookie handling, identity federation, and the simple
//! (non-OIDC) registration client.

pub mod federation;
pub mod login;
pub mod session;
pub mod signup;

pub use federation::federation_url;
pub use login::{AuthResponse, LoginCredentials, MOCK_TOKEN, UserProfile, mock_login, mock_user};
pub use session::{SESSION_COOKIE_NAME, clear_session_cookie, extract_session_token, session_cookie};
pub use signup::{SignupClient, SignupForm, SignupRequest};
