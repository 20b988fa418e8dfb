//! Body-area catalog and the selection set used by the affected-area picker

use super::forms::{FieldValue, FormError, SelectOption};
use serde::{Deserialize, Serialize};

/// One anatomical zone of the body diagrams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyRegion {
    pub id: &'static str,
    pub name: &'static str,
    /// Share of body surface area on the adult diagram
    pub adult_surface_percent: u8,
    /// Share of body surface area on the child (up to 10 years) diagram
    pub child_surface_percent: u8,
}

impl BodyRegion {
    pub fn surface_percent(&self, view: BodyView) -> u8 {
        match view {
            BodyView::Adult => self.adult_surface_percent,
            BodyView::Child => self.child_surface_percent,
        }
    }
}

const fn region(id: &'static str, name: &'static str, adult: u8, child: u8) -> BodyRegion {
    BodyRegion {
        id,
        name,
        adult_surface_percent: adult,
        child_surface_percent: child,
    }
}

pub const BODY_REGIONS: [BodyRegion; 8] = [
    region("head", "Cabeça", 9, 19),
    region("chest", "Tórax (frente)", 18, 13),
    region("abdomen", "Abdômen", 18, 13),
    region("back", "Dorso", 18, 13),
    region("leftArm", "Braço esquerdo", 9, 9),
    region("rightArm", "Braço direito", 9, 9),
    region("leftLeg", "Perna esquerda", 18, 13),
    region("rightLeg", "Perna direita", 18, 13),
];

/// The same regions as select options, for the affected-areas field
pub const REGION_OPTIONS: [SelectOption; 8] = [
    SelectOption::new("head", "Cabeça"),
    SelectOption::new("chest", "Tórax (frente)"),
    SelectOption::new("abdomen", "Abdômen"),
    SelectOption::new("back", "Dorso"),
    SelectOption::new("leftArm", "Braço esquerdo"),
    SelectOption::new("rightArm", "Braço direito"),
    SelectOption::new("leftLeg", "Perna esquerda"),
    SelectOption::new("rightLeg", "Perna direita"),
];

pub fn find_region(id: &str) -> Option<&'static BodyRegion> {
    BODY_REGIONS.iter().find(|r| r.id == id)
}

/// Which diagram is drawn. Both map to the same region ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyView {
    #[default]
    Adult,
    Child,
}

impl BodyView {
    pub fn toggle(&self) -> Self {
        match self {
            Self::Adult => Self::Child,
            Self::Child => Self::Adult,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Adult => "Adulto",
            Self::Child => "Criança até 10 anos",
        }
    }
}

/// Chosen region ids. Membership is what counts; insertion order is kept
/// only for display.
#[derive(Debug, Clone, Default, Eq)]
pub struct SelectionSet {
    ids: Vec<&'static str>,
}

impl PartialEq for SelectionSet {
    fn eq(&self, other: &Self) -> bool {
        self.ids.len() == other.ids.len() && self.ids.iter().all(|id| other.contains(id))
    }
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from stored ids, rejecting any id outside the catalog
    pub fn from_ids<I, S>(ids: I) -> Result<Self, FormError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ids.into_iter().try_fold(Self::new(), |set, id| {
            let id = id.as_ref();
            if set.contains(id) {
                Ok(set)
            } else {
                set.toggle(id)
            }
        })
    }

    /// Add the id if absent, remove it if present
    pub fn toggle(&self, region_id: &str) -> Result<Self, FormError> {
        let region =
            find_region(region_id).ok_or_else(|| FormError::UnknownRegion(region_id.to_string()))?;
        let mut ids = self.ids.clone();
        if let Some(pos) = ids.iter().position(|id| *id == region.id) {
            ids.remove(pos);
        } else {
            ids.push(region.id);
        }
        Ok(Self { ids })
    }

    pub fn contains(&self, region_id: &str) -> bool {
        self.ids.iter().any(|id| *id == region_id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> &[&'static str] {
        &self.ids
    }

    /// Region names in insertion order
    pub fn names(&self) -> Vec<&'static str> {
        self.ids
            .iter()
            .filter_map(|id| find_region(id))
            .map(|r| r.name)
            .collect()
    }

    /// Total surface percentage covered on the given diagram
    pub fn coverage(&self, view: BodyView) -> u32 {
        self.ids
            .iter()
            .filter_map(|id| find_region(id))
            .map(|r| u32::from(r.surface_percent(view)))
            .sum()
    }

    /// Human-readable line for the "Áreas selecionadas" box
    pub fn summary(&self) -> String {
        if self.is_empty() {
            "Nenhuma área selecionada".to_string()
        } else {
            self.names().join(", ")
        }
    }
}

impl From<&SelectionSet> for FieldValue {
    fn from(set: &SelectionSet) -> Self {
        FieldValue::List(set.ids.iter().map(|id| id.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    mod catalog {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_region_ids_are_unique() {
            let mut ids: Vec<_> = BODY_REGIONS.iter().map(|r| r.id).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), BODY_REGIONS.len());
        }

        #[test]
        fn test_options_mirror_regions() {
            for (region, option) in BODY_REGIONS.iter().zip(REGION_OPTIONS.iter()) {
                assert_eq!(region.id, option.value);
                assert_eq!(region.name, option.label);
            }
        }

        #[test]
        fn test_adult_percentages_total() {
            let adult: u32 = BODY_REGIONS
                .iter()
                .map(|r| u32::from(r.adult_surface_percent))
                .sum();
            assert_eq!(adult, 117);
        }

        #[test]
        fn test_find_region() {
            assert_eq!(find_region("leftArm").unwrap().name, "Braço esquerdo");
            assert!(find_region("tail").is_none());
        }
    }

    mod selection_set {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_toggle_adds_to_empty_set() {
            let set = SelectionSet::new().toggle("leftArm").unwrap();
            assert!(set.contains("leftArm"));
            assert_eq!(set.names(), vec!["Braço esquerdo"]);
        }

        #[test]
        fn test_toggle_is_self_inverse() {
            let base = SelectionSet::from_ids(["chest", "leftLeg"]).unwrap();
            let twice = base.toggle("head").unwrap().toggle("head").unwrap();
            assert_eq!(twice, base);

            let with_head = SelectionSet::from_ids(["head", "chest"]).unwrap();
            let twice = with_head.toggle("head").unwrap().toggle("head").unwrap();
            assert_eq!(twice, with_head);
        }

        #[test]
        fn test_unknown_region_is_rejected() {
            let set = SelectionSet::new();
            assert_eq!(
                set.toggle("tail"),
                Err(FormError::UnknownRegion("tail".to_string()))
            );
            assert!(SelectionSet::from_ids(["head", "tail"]).is_err());
        }

        #[test]
        fn test_names_keep_insertion_order() {
            let set = SelectionSet::new()
                .toggle("rightLeg")
                .unwrap()
                .toggle("head")
                .unwrap();
            assert_eq!(set.names(), vec!["Perna direita", "Cabeça"]);
            assert_eq!(set.summary(), "Perna direita, Cabeça");
        }

        #[test]
        fn test_equality_ignores_order() {
            let a = SelectionSet::from_ids(["head", "back"]).unwrap();
            let b = SelectionSet::from_ids(["back", "head"]).unwrap();
            assert_eq!(a, b);
        }

        #[test]
        fn test_from_ids_ignores_duplicates() {
            let set = SelectionSet::from_ids(["head", "head"]).unwrap();
            assert_eq!(set.len(), 1);
        }

        #[test]
        fn test_coverage_depends_on_view() {
            let set = SelectionSet::from_ids(["head", "leftLeg"]).unwrap();
            assert_eq!(set.coverage(BodyView::Adult), 27);
            assert_eq!(set.coverage(BodyView::Child), 32);
        }

        #[test]
        fn test_empty_summary() {
            assert_eq!(SelectionSet::new().summary(), "Nenhuma área selecionada");
        }

        #[test]
        fn test_into_field_value() {
            let set = SelectionSet::from_ids(["back"]).unwrap();
            assert_eq!(
                FieldValue::from(&set),
                FieldValue::List(vec!["back".to_string()])
            );
        }
    }

    #[test]
    fn test_view_toggle() {
        assert_eq!(BodyView::Adult.toggle(), BodyView::Child);
        assert_eq!(BodyView::Child.toggle(), BodyView::Adult);
    }
}
