//! Users.

use crate::client::{ApiError, ApiSession};
use crate::models::User;

const CURRENT_USER: &str = "user/me/";
const ACTIVE_USERS: &str = "usersfilter/?is_active=true";

impl ApiSession {
    /// The signed-in user. Callers send the browser to the login page on error.
    pub async fn get_current_user(&self) -> Result<User, ApiError> {
        self.get(CURRENT_USER).await
    }

    pub async fn get_users(&self) -> Vec<User> {
        self.or_default(ACTIVE_USERS, self.get_list(ACTIVE_USERS).await, Vec::new)
    }
}
