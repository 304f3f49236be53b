//! Resource type and base action lookup per record type
//!
//! Every record type has a resource type (used in audit events) and a base
//! action (the prefix of audit action names). Both default to the record
//! type's simple name in lower case; overrides are registered once at startup.

use crate::core::error::ConfigError;
use crate::core::record::Record;
use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Resource type and base action of one record type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNames {
    pub resource_type: String,
    pub base_action: String,
}

impl ResourceNames {
    pub fn new(resource_type: impl Into<String>, base_action: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            base_action: base_action.into(),
        }
    }

    /// Full action name, e.g. `enclosure` + `.create`
    pub fn action(&self, suffix: &str) -> String {
        format!("{}{}", self.base_action, suffix)
    }
}

/// Last path segment of a type name, without generic arguments
pub fn simple_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}

#[derive(Debug, Default, Clone)]
struct Override {
    resource_type: Option<String>,
    base_action: Option<String>,
}

/// Lookup table built at startup and shared by every service
#[derive(Debug, Clone, Default)]
pub struct ResourceTypeResolver {
    overrides: Arc<HashMap<TypeId, Override>>,
    cache: Arc<RwLock<HashMap<TypeId, ResourceNames>>>,
}

impl ResourceTypeResolver {
    pub fn builder() -> ResourceTypeResolverBuilder {
        ResourceTypeResolverBuilder::default()
    }

    /// Names for record type `R`, computed on first use
    pub fn resolve<R: Record>(&self) -> ResourceNames {
        let key = TypeId::of::<R>();

        if let Ok(cache) = self.cache.read() {
            if let Some(names) = cache.get(&key) {
                return names.clone();
            }
        }

        let default_name = simple_type_name::<R>().to_lowercase();
        let custom = self.overrides.get(&key).cloned().unwrap_or_default();
        let names = ResourceNames {
            resource_type: custom.resource_type.unwrap_or_else(|| default_name.clone()),
            base_action: custom.base_action.unwrap_or(default_name),
        };

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, names.clone());
        }
        names
    }

    pub fn resource_type<R: Record>(&self) -> String {
        self.resolve::<R>().resource_type
    }

    pub fn base_action<R: Record>(&self) -> String {
        self.resolve::<R>().base_action
    }
}

/// Collects overrides before the resolver is frozen
#[derive(Debug, Default)]
pub struct ResourceTypeResolverBuilder {
    known: HashMap<String, TypeId>,
    overrides: HashMap<TypeId, Override>,
}

impl ResourceTypeResolverBuilder {
    /// Make `R` addressable by its simple name in [`Self::override_named`]
    pub fn register<R: Record>(mut self) -> Self {
        self.known
            .insert(simple_type_name::<R>().to_string(), TypeId::of::<R>());
        self
    }

    pub fn resource_type<R: Record>(mut self, resource_type: impl Into<String>) -> Self {
        self = self.register::<R>();
        self.overrides
            .entry(TypeId::of::<R>())
            .or_default()
            .resource_type = Some(resource_type.into());
        self
    }

    pub fn base_action<R: Record>(mut self, base_action: impl Into<String>) -> Self {
        self = self.register::<R>();
        self.overrides
            .entry(TypeId::of::<R>())
            .or_default()
            .base_action = Some(base_action.into());
        self
    }

    /// Override by simple type name, as written in configuration files
    pub fn override_named(
        mut self,
        type_name: &str,
        resource_type: Option<String>,
        base_action: Option<String>,
    ) -> Result<Self, ConfigError> {
        let key = *self
            .known
            .get(type_name)
            .ok_or_else(|| ConfigError::UnknownType {
                type_name: type_name.to_string(),
            })?;
        let entry = self.overrides.entry(key).or_default();
        if resource_type.is_some() {
            entry.resource_type = resource_type;
        }
        if base_action.is_some() {
            entry.base_action = base_action;
        }
        Ok(self)
    }

    pub fn build(self) -> ResourceTypeResolver {
        ResourceTypeResolver {
            overrides: Arc::new(self.overrides),
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::AuditFields;
    use crate::impl_record;

    #[derive(Debug, Clone, Default)]
    struct FeedingLog {
        id: Option<i64>,
        audit: AuditFields,
    }
    impl_record!(FeedingLog, i64, []);

    #[derive(Debug, Clone, Default)]
    struct Enclosure {
        id: Option<i64>,
        audit: AuditFields,
    }
    impl_record!(Enclosure, i64, []);

    #[test]
    fn test_simple_type_name() {
        assert_eq!(simple_type_name::<FeedingLog>(), "FeedingLog");
        assert_eq!(simple_type_name::<Vec<String>>(), "Vec");
    }

    #[test]
    fn test_default_is_lowercase_simple_name() {
        let resolver = ResourceTypeResolver::default();
        let names = resolver.resolve::<FeedingLog>();
        assert_eq!(names.resource_type, "feedinglog");
        assert_eq!(names.base_action, "feedinglog");
        assert_eq!(names.action(".create"), "feedinglog.create");
    }

    #[test]
    fn test_overrides_take_precedence() {
        let resolver = ResourceTypeResolver::builder()
            .resource_type::<FeedingLog>("feeding")
            .base_action::<FeedingLog>("reptile.feeding")
            .build();

        assert_eq!(resolver.resource_type::<FeedingLog>(), "feeding");
        assert_eq!(resolver.base_action::<FeedingLog>(), "reptile.feeding");
        assert_eq!(resolver.resource_type::<Enclosure>(), "enclosure");
    }

    #[test]
    fn test_named_override() {
        let resolver = ResourceTypeResolver::builder()
            .register::<Enclosure>()
            .override_named("Enclosure", Some("tank".into()), None)
            .unwrap()
            .build();
        let names = resolver.resolve::<Enclosure>();
        assert_eq!(names.resource_type, "tank");
        assert_eq!(names.base_action, "enclosure");
    }

    #[test]
    fn test_named_override_unknown_type() {
        let result =
            ResourceTypeResolver::builder().override_named("Nope", Some("x".into()), None);
        assert!(matches!(result, Err(ConfigError::UnknownType { .. })));
    }

    #[test]
    fn test_resolution_is_cached() {
        let resolver = ResourceTypeResolver::default();
        let first = resolver.resolve::<Enclosure>();
        let clone = resolver.clone();
        assert_eq!(clone.resolve::<Enclosure>(), first);
        assert_eq!(resolver.cache.read().unwrap().len(), 1);
    }
}
