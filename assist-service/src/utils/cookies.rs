//! Set-Cookie header construction for the session cookies.

/// Build a Set-Cookie value for an httpOnly session cookie.
pub fn session_cookie(name: &str, value: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        name, value, max_age_secs
    )
}

/// Build a Set-Cookie value readable by client-side code.
pub fn client_cookie(name: &str, value: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; Path=/; SameSite=Lax; Max-Age={}",
        name, value, max_age_secs
    )
}

/// Build a Set-Cookie value that expires the cookie immediately.
pub fn clear_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0", name)
}
