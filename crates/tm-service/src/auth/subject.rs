//! Token subject parsing.
//!
//! Identity provider subjects look like `auth0|<user-uuid>`. The part after
//! the first `|` is the user's public uid in this service.

/// A parsed `sub` claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    /// Connection/provider prefix, empty when the subject has none.
    pub provider: String,

    /// User identifier as issued; not yet checked to be a UUID.
    pub user_uuid: String,
}

impl Subject {
    pub fn parse(sub: &str) -> Self {
        match sub.split_once('|') {
            Some((provider, user_uuid)) => Self {
                provider: provider.to_string(),
                user_uuid: user_uuid.to_string(),
            },
            None => Self {
                provider: String::new(),
                user_uuid: sub.to_string(),
            },
        }
    }
}
