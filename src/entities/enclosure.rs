//! Enclosures: terrariums, vivariums and friends, owned by a user

use crate::core::mapper::{Mapper, MappingConditions};
use crate::core::record::{AuditFields, Owned, OwnedTransferObject, Updatable};
use crate::{field_enum, impl_record, impl_transfer_object};
use serde::{Deserialize, Serialize};

field_enum!(
    /// Kind of enclosure
    EnclosureType {
        #[default]
        Terrarium => "TERRARIUM",
        Vivarium => "VIVARIUM",
        Paludarium => "PALUDARIUM",
        Aquaterrarium => "AQUATERRARIUM",
        Custom => "CUSTOM",
    }
);

#[derive(Debug, Clone, Default)]
pub struct Enclosure {
    pub id: Option<i64>,
    pub audit: AuditFields,
    pub name: Option<String>,
    pub enclosure_type: Option<EnclosureType>,
    pub dimensions: Option<String>,
    pub substrate: Option<String>,
    pub heating: Option<String>,
    pub lighting: Option<String>,
    pub humidity: Option<String>,
    pub temperature: Option<String>,
    pub user_id: Option<i64>,
    pub notes: Option<String>,
}

impl_record!(
    Enclosure,
    i64,
    [
        name,
        enclosure_type,
        dimensions,
        substrate,
        heating,
        lighting,
        humidity,
        temperature,
        user_id,
        notes
    ]
);

impl Owned for Enclosure {
    type OwnerId = i64;
    const OWNER_FIELD: &'static str = "user_id";

    fn owner_id(&self) -> Option<i64> {
        self.user_id
    }
}

impl Updatable<EnclosureDto> for Enclosure {
    fn apply_update(&mut self, dto: &EnclosureDto) {
        if dto.name.is_some() {
            self.name = dto.name.clone();
        }
        if dto.enclosure_type.is_some() {
            self.enclosure_type = dto.enclosure_type;
        }
        self.dimensions = dto.dimensions.clone();
        self.substrate = dto.substrate.clone();
        self.heating = dto.heating.clone();
        self.lighting = dto.lighting.clone();
        self.humidity = dto.humidity.clone();
        self.temperature = dto.temperature.clone();
        self.notes = dto.notes.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnclosureDto {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub audit: AuditFields,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub enclosure_type: Option<EnclosureType>,
    pub dimensions: Option<String>,
    pub substrate: Option<String>,
    pub heating: Option<String>,
    pub lighting: Option<String>,
    pub humidity: Option<String>,
    pub temperature: Option<String>,
    pub user_id: Option<i64>,
    pub notes: Option<String>,
}

impl_transfer_object!(
    EnclosureDto,
    i64,
    [
        name,
        enclosure_type,
        dimensions,
        substrate,
        heating,
        lighting,
        humidity,
        temperature,
        user_id,
        notes
    ]
);

impl OwnedTransferObject for EnclosureDto {
    type OwnerId = i64;

    fn set_owner_id(&mut self, owner: i64) {
        self.user_id = Some(owner);
    }
}

impl EnclosureDto {
    pub fn new(name: impl Into<String>, enclosure_type: EnclosureType) -> Self {
        Self {
            name: Some(name.into()),
            enclosure_type: Some(enclosure_type),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EnclosureMapper;

impl Mapper<Enclosure, EnclosureDto> for EnclosureMapper {
    fn to_dto_with(&self, record: &Enclosure, _conditions: &MappingConditions) -> EnclosureDto {
        EnclosureDto {
            id: record.id,
            audit: record.audit.clone(),
            name: record.name.clone(),
            enclosure_type: record.enclosure_type,
            dimensions: record.dimensions.clone(),
            substrate: record.substrate.clone(),
            heating: record.heating.clone(),
            lighting: record.lighting.clone(),
            humidity: record.humidity.clone(),
            temperature: record.temperature.clone(),
            user_id: record.user_id,
            notes: record.notes.clone(),
        }
    }

    fn map_to_record(&self, dto: &EnclosureDto) -> Enclosure {
        Enclosure {
            id: dto.id,
            audit: AuditFields::default(),
            name: dto.name.clone(),
            enclosure_type: dto.enclosure_type,
            dimensions: dto.dimensions.clone(),
            substrate: dto.substrate.clone(),
            heating: dto.heating.clone(),
            lighting: dto.lighting.clone(),
            humidity: dto.humidity.clone(),
            temperature: dto.temperature.clone(),
            user_id: dto.user_id,
            notes: dto.notes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mapper::apply_update;
    use serde_json::json;

    #[test]
    fn test_update_policy() {
        let mut record = Enclosure {
            id: Some(1),
            name: Some("Tank-1".into()),
            enclosure_type: Some(EnclosureType::Vivarium),
            substrate: Some("coco fiber".into()),
            user_id: Some(7),
            ..Default::default()
        };
        let dto = EnclosureDto {
            id: Some(1),
            notes: Some("new lamp".into()),
            ..Default::default()
        };

        apply_update(&dto, &mut record);

        assert_eq!(record.name.as_deref(), Some("Tank-1"));
        assert_eq!(record.enclosure_type, Some(EnclosureType::Vivarium));
        assert_eq!(record.substrate, None);
        assert_eq!(record.notes.as_deref(), Some("new lamp"));
        assert_eq!(record.user_id, Some(7));
    }

    #[test]
    fn test_dto_wire_format() {
        let dto: EnclosureDto = serde_json::from_value(json!({
            "name": "Tank-1",
            "type": "PALUDARIUM",
            "created_by": "alice"
        }))
        .unwrap();
        assert_eq!(dto.enclosure_type, Some(EnclosureType::Paludarium));
        assert_eq!(dto.audit.created_by.as_deref(), Some("alice"));
    }
}
