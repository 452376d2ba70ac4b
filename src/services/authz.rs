use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;

use crate::db::queries;

/// What an admin request presents: a bearer token, an email claim from the
/// upstream auth provider, or both.
#[derive(Debug, Default, Clone)]
pub struct AdminCredentials {
    pub bearer_token: Option<String>,
    pub email: Option<String>,
}

/// Authorization gate for back-office operations. The booking core only ever
/// sees the boolean verdict.
#[async_trait]
pub trait AuthorizationGate: Send + Sync {
    async fn is_privileged(&self, credentials: &AdminCredentials) -> bool;
}

/// Default gate: a matching service token grants access, as does an email
/// with an `admin_roles` row. The token path covers initial setup before any
/// role rows exist.
pub struct TokenRoleGate {
    admin_token: String,
    db: Arc<Mutex<Connection>>,
}

impl TokenRoleGate {
    pub fn new(admin_token: String, db: Arc<Mutex<Connection>>) -> Self {
        Self { admin_token, db }
    }
}

#[async_trait]
impl AuthorizationGate for TokenRoleGate {
    async fn is_privileged(&self, credentials: &AdminCredentials) -> bool {
        if credentials
            .bearer_token
            .as_deref()
            .is_some_and(|t| !self.admin_token.is_empty() && t == self.admin_token)
        {
            return true;
        }

        if let Some(email) = credentials.email.as_deref() {
            let db = match self.db.lock() {
                Ok(db) => db,
                Err(_) => return false,
            };
            match queries::is_admin_email(&db, email) {
                Ok(is_admin) => return is_admin,
                Err(e) => {
                    tracing::error!(error = %e, "admin role lookup failed");
                    return false;
                }
            }
        }

        false
    }
}
