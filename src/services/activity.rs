//! Activity (event stream) operations.

use crate::client::GitHubClient;
use crate::errors::GitHubResult;
use crate::pagination::{Page, PaginationParams};
use crate::types::Event;

/// Which slice of a user's event stream to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventVisibility {
    /// Public and, for the authenticated identity itself, private events.
    Authenticated,
    /// Public events only.
    Public,
}

impl EventVisibility {
    /// Picks the widest visibility the credential allows.
    pub fn for_credential(authenticated: bool) -> Self {
        if authenticated {
            Self::Authenticated
        } else {
            Self::Public
        }
    }

    fn path(self, username: &str) -> String {
        match self {
            Self::Authenticated => format!("/users/{}/events", username),
            Self::Public => format!("/users/{}/events/public", username),
        }
    }
}

/// Service for activity operations.
pub struct ActivityService<'a> {
    client: &'a GitHubClient,
}

impl<'a> ActivityService<'a> {
    /// Creates a new activity service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Lists events performed by a user, newest first.
    pub async fn list_events_page(
        &self,
        username: &str,
        visibility: EventVisibility,
        pagination: &PaginationParams,
    ) -> GitHubResult<Page<Event>> {
        self.client
            .get_page(&visibility.path(username), &[] as &[(&str, &str)], pagination)
            .await
    }
}
