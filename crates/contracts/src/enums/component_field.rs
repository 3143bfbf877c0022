use serde::{Deserialize, Serialize};

/// Ширина колонки PDF для подписей, которых нет в каталоге
pub const FALLBACK_PDF_WIDTH: f32 = 25.0;

/// Максимальное число полей, которое можно вывести в таблицу
pub const MAX_SELECTED_FIELDS: usize = 15;

/// Атрибуты компонента, доступные для вывода в таблицу и PDF
///
/// Каждый вариант несёт ключ, подпись и ширину колонки, поэтому
/// прямое и обратное соответствие ключ/подпись не может разойтись.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentField {
    ComponentCode,
    ComponentDescription,
    ComponentValidFrom,
    ComponentValidTo,
    ComponentQuantity,
    ComponentUomId,
    ComponentBaseQuantity,
    ComponentBaseUomId,
    ComponentPackagingTypeId,
    ComponentPackagingMaterial,
    ComponentUnitWeight,
    WeightUnitMeasureId,
    PercentMechanicalPcrContent,
    ComponentsReference,
    ComponentMaterialGroup,
    PercentWW,
    PercentMechanicalPirContent,
    PercentChemicalRecycledContent,
    PercentBioSourced,
    MaterialStructureMultimaterials,
    ComponentPackagingLevelId,
    ComponentDimensions,
}

impl ComponentField {
    pub const COUNT: usize = 22;

    /// Все поля в порядке каталога
    pub const ALL: [ComponentField; Self::COUNT] = [
        ComponentField::ComponentCode,
        ComponentField::ComponentDescription,
        ComponentField::ComponentValidFrom,
        ComponentField::ComponentValidTo,
        ComponentField::ComponentQuantity,
        ComponentField::ComponentUomId,
        ComponentField::ComponentBaseQuantity,
        ComponentField::ComponentBaseUomId,
        ComponentField::ComponentPackagingTypeId,
        ComponentField::ComponentPackagingMaterial,
        ComponentField::ComponentUnitWeight,
        ComponentField::WeightUnitMeasureId,
        ComponentField::PercentMechanicalPcrContent,
        ComponentField::ComponentsReference,
        ComponentField::ComponentMaterialGroup,
        ComponentField::PercentWW,
        ComponentField::PercentMechanicalPirContent,
        ComponentField::PercentChemicalRecycledContent,
        ComponentField::PercentBioSourced,
        ComponentField::MaterialStructureMultimaterials,
        ComponentField::ComponentPackagingLevelId,
        ComponentField::ComponentDimensions,
    ];

    /// Поля, выбранные по умолчанию (первые 13 из каталога)
    pub const DEFAULTS: [ComponentField; 13] = [
        ComponentField::ComponentCode,
        ComponentField::ComponentDescription,
        ComponentField::ComponentValidFrom,
        ComponentField::ComponentValidTo,
        ComponentField::ComponentQuantity,
        ComponentField::ComponentUomId,
        ComponentField::ComponentBaseQuantity,
        ComponentField::ComponentBaseUomId,
        ComponentField::ComponentPackagingTypeId,
        ComponentField::ComponentPackagingMaterial,
        ComponentField::ComponentUnitWeight,
        ComponentField::WeightUnitMeasureId,
        ComponentField::PercentMechanicalPcrContent,
    ];

    /// Внутренний ключ поля
    pub fn key(&self) -> &'static str {
        match self {
            ComponentField::ComponentCode => "component_code",
            ComponentField::ComponentDescription => "component_description",
            ComponentField::ComponentValidFrom => "component_valid_from",
            ComponentField::ComponentValidTo => "component_valid_to",
            ComponentField::ComponentQuantity => "component_quantity",
            ComponentField::ComponentUomId => "component_uom_id",
            ComponentField::ComponentBaseQuantity => "component_base_quantity",
            ComponentField::ComponentBaseUomId => "component_base_uom_id",
            ComponentField::ComponentPackagingTypeId => "component_packaging_type_id",
            ComponentField::ComponentPackagingMaterial => "component_packaging_material",
            ComponentField::ComponentUnitWeight => "component_unit_weight",
            ComponentField::WeightUnitMeasureId => "weight_unit_measure_id",
            ComponentField::PercentMechanicalPcrContent => "percent_mechanical_pcr_content",
            ComponentField::ComponentsReference => "components_reference",
            ComponentField::ComponentMaterialGroup => "component_material_group",
            ComponentField::PercentWW => "percent_w_w",
            ComponentField::PercentMechanicalPirContent => "percent_mechanical_pir_content",
            ComponentField::PercentChemicalRecycledContent => "percent_chemical_recycled_content",
            ComponentField::PercentBioSourced => "percent_bio_sourced",
            ComponentField::MaterialStructureMultimaterials => "material_structure_multimaterials",
            ComponentField::ComponentPackagingLevelId => "component_packaging_level_id",
            ComponentField::ComponentDimensions => "component_dimensions",
        }
    }

    /// Человекочитаемая подпись (заголовок колонки)
    pub fn label(&self) -> &'static str {
        match self {
            ComponentField::ComponentCode => "Component Code",
            ComponentField::ComponentDescription => "Component Description",
            ComponentField::ComponentValidFrom => "Component validity date - From",
            ComponentField::ComponentValidTo => "Component validity date - To",
            ComponentField::ComponentQuantity => "Component Qty",
            ComponentField::ComponentUomId => "Component UoM",
            ComponentField::ComponentBaseQuantity => "Component Base Qty",
            ComponentField::ComponentBaseUomId => "Component Base UoM",
            ComponentField::ComponentPackagingTypeId => "Component Packaging Type",
            ComponentField::ComponentPackagingMaterial => "Component Packaging Material",
            ComponentField::ComponentUnitWeight => "Component Unit Weight",
            ComponentField::WeightUnitMeasureId => "Weight Unit of Measure",
            ComponentField::PercentMechanicalPcrContent => {
                "% Mechanical Post-Consumer Recycled Content (inc. Chemical)"
            }
            ComponentField::ComponentsReference => "Component reference",
            ComponentField::ComponentMaterialGroup => "Component Material Group (Category)",
            ComponentField::PercentWW => "%w/w",
            ComponentField::PercentMechanicalPirContent => {
                "% Mechanical Post-Industrial Recycled Content"
            }
            ComponentField::PercentChemicalRecycledContent => "% Chemical Recycled Content",
            ComponentField::PercentBioSourced => "% Bio-sourced?",
            ComponentField::MaterialStructureMultimaterials => {
                "Material structure - multimaterials only (with % wt)"
            }
            ComponentField::ComponentPackagingLevelId => "Component packaging level",
            ComponentField::ComponentDimensions => "Component dimensions (3D - LxWxH, 2D - LxW)",
        }
    }

    /// Ширина колонки в PDF, мм
    pub fn pdf_width(&self) -> f32 {
        match self {
            ComponentField::ComponentCode => 25.0,
            ComponentField::ComponentDescription => 40.0,
            ComponentField::ComponentValidFrom => 30.0,
            ComponentField::ComponentValidTo => 30.0,
            ComponentField::ComponentQuantity => 20.0,
            ComponentField::ComponentUomId => 20.0,
            ComponentField::ComponentBaseQuantity => 25.0,
            ComponentField::ComponentBaseUomId => 25.0,
            ComponentField::ComponentPackagingTypeId => 35.0,
            ComponentField::ComponentPackagingMaterial => 35.0,
            ComponentField::ComponentUnitWeight => 25.0,
            ComponentField::WeightUnitMeasureId => 30.0,
            ComponentField::PercentMechanicalPcrContent => 50.0,
            ComponentField::ComponentsReference => 25.0,
            ComponentField::ComponentMaterialGroup => 35.0,
            ComponentField::PercentWW => 15.0,
            ComponentField::PercentMechanicalPirContent => 45.0,
            ComponentField::PercentChemicalRecycledContent => 30.0,
            ComponentField::PercentBioSourced => 20.0,
            ComponentField::MaterialStructureMultimaterials => 50.0,
            ComponentField::ComponentPackagingLevelId => 30.0,
            ComponentField::ComponentDimensions => 40.0,
        }
    }

    /// Ключи исходной строки API, из которых читается значение (по приоритету)
    pub fn source_keys(&self) -> &'static [&'static str] {
        match self {
            ComponentField::ComponentValidFrom => &["mapping_valid_from", "component_valid_from"],
            ComponentField::ComponentValidTo => &["mapping_valid_to", "component_valid_to"],
            ComponentField::ComponentPackagingMaterial => {
                &["Component Packaging Material", "component_packaging_material"]
            }
            ComponentField::ComponentCode => &["component_code"],
            ComponentField::ComponentDescription => &["component_description"],
            ComponentField::ComponentQuantity => &["component_quantity"],
            ComponentField::ComponentUomId => &["component_uom_id"],
            ComponentField::ComponentBaseQuantity => &["component_base_quantity"],
            ComponentField::ComponentBaseUomId => &["component_base_uom_id"],
            ComponentField::ComponentPackagingTypeId => &["component_packaging_type_id"],
            ComponentField::ComponentUnitWeight => &["component_unit_weight"],
            ComponentField::WeightUnitMeasureId => &["weight_unit_measure_id"],
            ComponentField::PercentMechanicalPcrContent => &["percent_mechanical_pcr_content"],
            ComponentField::ComponentsReference => &["components_reference"],
            ComponentField::ComponentMaterialGroup => &["component_material_group"],
            ComponentField::PercentWW => &["percent_w_w"],
            ComponentField::PercentMechanicalPirContent => &["percent_mechanical_pir_content"],
            ComponentField::PercentChemicalRecycledContent => {
                &["percent_chemical_recycled_content"]
            }
            ComponentField::PercentBioSourced => &["percent_bio_sourced"],
            ComponentField::MaterialStructureMultimaterials => {
                &["material_structure_multimaterials"]
            }
            ComponentField::ComponentPackagingLevelId => &["component_packaging_level_id"],
            ComponentField::ComponentDimensions => &["component_dimensions"],
        }
    }

    /// Значение поля — дата, которую нужно привести к DD/MM/YYYY
    pub fn is_date(&self) -> bool {
        matches!(
            self,
            ComponentField::ComponentValidFrom | ComponentField::ComponentValidTo
        )
    }

    /// Подпись содержит `%`, числовые значения выводятся со знаком процента
    pub fn is_percent(&self) -> bool {
        self.label().contains('%')
    }

    /// Парсинг из подписи
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.label() == label)
    }

    /// Парсинг из ключа
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.key() == key)
    }

    /// Все подписи в порядке каталога (для мультиселекта)
    pub fn all_labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|f| f.label()).collect()
    }

    pub fn defaults() -> Vec<ComponentField> {
        Self::DEFAULTS.to_vec()
    }
}

/// Ширина колонки PDF по подписи заголовка
pub fn pdf_width_for_label(label: &str) -> f32 {
    ComponentField::from_label(label)
        .map(|f| f.pdf_width())
        .unwrap_or(FALLBACK_PDF_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_is_bijective() {
        let keys: HashSet<_> = ComponentField::ALL.iter().map(|f| f.key()).collect();
        let labels: HashSet<_> = ComponentField::ALL.iter().map(|f| f.label()).collect();
        assert_eq!(keys.len(), ComponentField::COUNT);
        assert_eq!(labels.len(), ComponentField::COUNT);

        for field in ComponentField::ALL {
            assert_eq!(ComponentField::from_label(field.label()), Some(field));
            assert_eq!(ComponentField::from_key(field.key()), Some(field));
        }
    }

    #[test]
    fn test_serde_uses_internal_key() {
        for field in ComponentField::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.key()));
        }
    }

    #[test]
    fn test_defaults_are_catalog_prefix() {
        assert_eq!(ComponentField::DEFAULTS.len(), 13);
        assert_eq!(&ComponentField::ALL[..13], &ComponentField::DEFAULTS[..]);
        assert_eq!(
            ComponentField::DEFAULTS[12].label(),
            "% Mechanical Post-Consumer Recycled Content (inc. Chemical)"
        );
    }

    #[test]
    fn test_pdf_width_fallback() {
        assert_eq!(pdf_width_for_label("%w/w"), 15.0);
        assert_eq!(pdf_width_for_label("Unknown column"), FALLBACK_PDF_WIDTH);
    }

    #[test]
    fn test_percent_fields() {
        assert!(ComponentField::PercentWW.is_percent());
        assert!(ComponentField::PercentBioSourced.is_percent());
        assert!(!ComponentField::ComponentQuantity.is_percent());
    }
}
