//! Users
//!
//! Identity is resolved by an external auth collaborator; this crate only
//! ever sees the resulting user id, passed explicitly into each call.

use crate::uuids::TypedUuid;

#[derive(Debug)]
pub struct User;

/// User UUID
pub type UserUuid = TypedUuid<User>;
