use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;

use crate::auth::session::AuthUser;
use crate::state::AppState;

// Plain HTML shells; the listing and profile pages fill themselves from the
// JSON API.

const HOME: &str = r#"<!DOCTYPE html>
<html>
<head><title>Astroshelter</title></head>
<body>
  <h1>Astroshelter</h1>
  <p>Every stray deserves a home planet.</p>
  <nav>
    <a href="/animals">Animals</a>
    <a href="/signin">Sign in</a>
    <a href="/signup">Sign up</a>
    <a href="/profile">Profile</a>
  </nav>
</body>
</html>"#;

const ANIMALS: &str = r#"<!DOCTYPE html>
<html>
<head><title>Animals - Astroshelter</title></head>
<body>
  <h1>Our animals</h1>
  <div class="animal-container" data-source="/api/animals"></div>
</body>
</html>"#;

const SIGNIN: &str = r#"<!DOCTYPE html>
<html>
<head><title>Sign in - Astroshelter</title></head>
<body>
  <h1>Sign in</h1>
  <!-- submits {"username","password"} as JSON -->
  <form class="signin-form" data-endpoint="/api/auth/signin">
    <input name="username" placeholder="Username">
    <input name="password" type="password" placeholder="Password">
    <button type="submit">Sign in</button>
  </form>
</body>
</html>"#;

const SIGNUP: &str = r#"<!DOCTYPE html>
<html>
<head><title>Sign up - Astroshelter</title></head>
<body>
  <h1>Sign up</h1>
  <!-- submits {"username","email","firstName","lastName","password"} as JSON -->
  <form class="signup-form" data-endpoint="/api/auth/signup">
    <input name="username" placeholder="Username">
    <input name="email" type="email" placeholder="Email">
    <input name="firstName" placeholder="First name">
    <input name="lastName" placeholder="Last name">
    <input name="password" type="password" placeholder="Password">
    <button type="submit">Sign up</button>
  </form>
</body>
</html>"#;

const PROFILE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Profile - Astroshelter</title></head>
<body>
  <h1>Your profile</h1>
  <div class="profile" data-source="/api/profile"></div>
</body>
</html>"#;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/home", get(home))
        .route("/animals", get(animals))
        .route("/signin", get(sign_in))
        .route("/signup", get(sign_up))
        .route("/profile", get(profile))
}

async fn home() -> Html<&'static str> {
    Html(HOME)
}

async fn animals() -> Html<&'static str> {
    Html(ANIMALS)
}

async fn sign_in() -> Html<&'static str> {
    Html(SIGNIN)
}

async fn sign_up() -> Html<&'static str> {
    Html(SIGNUP)
}

/// Session-gated: without a live session the browser is sent to sign-in.
async fn profile(user: Option<AuthUser>) -> Response {
    match user {
        Some(_) => Html(PROFILE).into_response(),
        None => Redirect::to("/signin").into_response(),
    }
}
