//! Keepers using the system
//!
//! Credentials are handled outside this crate; a user here is the directory
//! entry that principals resolve to.

use crate::core::mapper::{Mapper, MappingConditions};
use crate::core::record::{AuditFields, Updatable};
use crate::{field_enum, impl_record, impl_transfer_object};
use serde::{Deserialize, Serialize};

field_enum!(
    UserRole {
        #[default]
        User => "USER",
        Admin => "ADMIN",
    }
);

#[derive(Debug, Clone, Default)]
pub struct User {
    pub id: Option<i64>,
    pub audit: AuditFields,
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub enabled: Option<bool>,
}

impl_record!(User, i64, [username, email, role, enabled], unique [username]);

impl Updatable<UserDto> for User {
    fn apply_update(&mut self, dto: &UserDto) {
        if dto.username.is_some() {
            self.username = dto.username.clone();
        }
        if dto.email.is_some() {
            self.email = dto.email.clone();
        }
        if dto.role.is_some() {
            self.role = dto.role;
        }
        if dto.enabled.is_some() {
            self.enabled = dto.enabled;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub audit: AuditFields,
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub enabled: Option<bool>,
}

impl_transfer_object!(UserDto, i64, [username, email, role, enabled]);

impl UserDto {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            email: Some(email.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UserMapper;

impl Mapper<User, UserDto> for UserMapper {
    fn to_dto_with(&self, record: &User, _conditions: &MappingConditions) -> UserDto {
        UserDto {
            id: record.id,
            audit: record.audit.clone(),
            username: record.username.clone(),
            email: record.email.clone(),
            role: record.role,
            enabled: record.enabled,
        }
    }

    fn map_to_record(&self, dto: &UserDto) -> User {
        User {
            id: dto.id,
            audit: AuditFields::default(),
            username: dto.username.clone(),
            email: dto.email.clone(),
            role: Some(dto.role.unwrap_or_default()),
            enabled: Some(dto.enabled.unwrap_or(true)),
        }
    }
}
