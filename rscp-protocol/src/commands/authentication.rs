use alloc::string::String;

use crate::tags;
use crate::value::{ContainerBuilder, Value};

/// Login of the device's user portal
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            user: user.into(),
            password: password.into(),
        }
    }

    /// `RSCP_REQ_AUTHENTICATION { USER, PASSWORD }`
    pub fn request(&self) -> Value {
        let mut auth = ContainerBuilder::new(tags::RSCP_REQ_AUTHENTICATION);
        auth.append(tags::RSCP_AUTHENTICATION_USER, self.user.as_str())
            .append(tags::RSCP_AUTHENTICATION_PASSWORD, self.password.as_str());
        auth.build()
    }
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}
