//! Input checks applied before a request is sent.

pub const USERNAME_MIN_LEN: usize = 4;
pub const USERNAME_MAX_LEN: usize = 16;
pub const PASSWORD_MIN_LEN: usize = 4;

/// Usernames are 4 to 16 characters.
pub fn validate_username(username: Option<&str>) -> bool {
    username
        .map(|u| (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&u.chars().count()))
        .unwrap_or(false)
}

/// Passwords are at least 4 characters.
pub fn validate_password(password: Option<&str>) -> bool {
    password
        .map(|p| p.chars().count() >= PASSWORD_MIN_LEN)
        .unwrap_or(false)
}

pub fn check_passwords(password: &str, confirm: &str) -> bool {
    password == confirm
}

/// A picked file with no size and no name means nothing was picked.
pub fn is_file_empty(size: u64, name: &str) -> bool {
    size == 0 && name.is_empty()
}
