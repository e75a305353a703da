//! # FHIR Bundle Model
//!
//! The subset of FHIR R4 carried by immunization health cards: a
//! `collection` bundle of Patient and Immunization resources linked by
//! `resource:N` references.
//!
//! Entries keep their resource as raw JSON so bundles containing other
//! resource types (lab results, for instance) still decode; [`Resource`]
//! dispatches on `resourceType` when a typed view is needed.

use serde::{Deserialize, Serialize};

/// A FHIR Bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FhirBundle {
    /// Always `"Bundle"`.
    pub resource_type: String,
    /// Bundle type; `"collection"` for health cards.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub bundle_type: Option<String>,
    /// Bundle entries, in document order.
    #[serde(default)]
    pub entry: Vec<BundleEntry>,
}

/// One entry of a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    /// Entry URL, e.g. `resource:0`, used as the target of references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,
    /// The resource, as JSON.
    pub resource: serde_json::Value,
}

impl BundleEntry {
    /// The `resourceType` of this entry, if present.
    pub fn resource_type(&self) -> Option<&str> {
        self.resource.get("resourceType").and_then(|v| v.as_str())
    }

    /// Typed view of the resource.
    pub fn parse_resource(&self) -> Result<Resource, serde_json::Error> {
        Resource::from_value(&self.resource)
    }
}

impl FhirBundle {
    /// Find the entry a reference such as `resource:0` points to.
    pub fn resolve_reference(&self, reference: &str) -> Option<&BundleEntry> {
        self.entry
            .iter()
            .find(|e| e.full_url.as_deref() == Some(reference))
    }
}

/// A typed bundle resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    /// A Patient resource.
    Patient(Patient),
    /// An Immunization resource.
    Immunization(Box<Immunization>),
    /// Any other resource type.
    Other {
        /// The declared `resourceType`, or empty if absent.
        resource_type: String,
    },
}

impl Resource {
    /// Dispatch on `resourceType` and deserialize the matching shape.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        match value.get("resourceType").and_then(|v| v.as_str()) {
            Some("Patient") => Ok(Self::Patient(serde_json::from_value(value.clone())?)),
            Some("Immunization") => Ok(Self::Immunization(Box::new(serde_json::from_value(
                value.clone(),
            )?))),
            other => Ok(Self::Other {
                resource_type: other.unwrap_or_default().to_string(),
            }),
        }
    }
}

/// A FHIR Patient.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Names, most relevant first.
    #[serde(default)]
    pub name: Vec<HumanName>,
    /// Date of birth (`YYYY`, `YYYY-MM`, or `YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
}

/// A FHIR HumanName.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HumanName {
    /// Family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    /// Given names, in order.
    #[serde(default)]
    pub given: Vec<String>,
}

/// A FHIR Immunization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Immunization {
    /// Event status, normally `"completed"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// The vaccine product.
    pub vaccine_code: CodeableConcept,
    /// Reference to the Patient entry.
    pub patient: Reference,
    /// When the dose was given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence_date_time: Option<String>,
    /// Who administered the dose.
    #[serde(default)]
    pub performer: Vec<Performer>,
    /// Vaccine lot number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot_number: Option<String>,
}

/// A FHIR CodeableConcept.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodeableConcept {
    /// Codes from terminology systems.
    #[serde(default)]
    pub coding: Vec<Coding>,
}

/// A FHIR Coding.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Coding {
    /// Terminology system URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Code within the system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Human-readable text supplied by the issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// A FHIR Reference.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Reference {
    /// Literal reference, e.g. `resource:0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Text alternative for the referenced resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// An Immunization performer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Performer {
    /// The organization or practitioner.
    #[serde(default)]
    pub actor: Reference,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{bundle_with_entries, EXAMPLE_PAYLOAD};

    fn example_bundle() -> FhirBundle {
        let payload: serde_json::Value = serde_json::from_str(EXAMPLE_PAYLOAD).unwrap();
        serde_json::from_value(payload["vc"]["credentialSubject"]["fhirBundle"].clone()).unwrap()
    }

    #[test]
    fn example_bundle_has_patient_and_two_doses() {
        let bundle = example_bundle();
        assert_eq!(bundle.bundle_type.as_deref(), Some("collection"));
        assert_eq!(bundle.entry.len(), 3);

        let Resource::Patient(patient) = bundle.entry[0].parse_resource().unwrap() else {
            panic!("first entry should be a patient");
        };
        assert_eq!(patient.name[0].family.as_deref(), Some("Anyperson"));
        assert_eq!(patient.name[0].given, vec!["John", "B."]);
        assert_eq!(patient.birth_date.as_deref(), Some("1951-01-20"));

        let Resource::Immunization(imm) = bundle.entry[2].parse_resource().unwrap() else {
            panic!("third entry should be an immunization");
        };
        assert_eq!(imm.occurrence_date_time.as_deref(), Some("2021-01-29"));
        assert_eq!(imm.lot_number.as_deref(), Some("0000007"));
        assert_eq!(imm.vaccine_code.coding[0].code.as_deref(), Some("207"));
        assert_eq!(
            imm.performer[0].actor.display.as_deref(),
            Some("ABC General Hospital")
        );
    }

    #[test]
    fn resolves_patient_reference() {
        let bundle = example_bundle();
        let entry = bundle.resolve_reference("resource:0").unwrap();
        assert_eq!(entry.resource_type(), Some("Patient"));
        assert!(bundle.resolve_reference("resource:9").is_none());
    }

    #[test]
    fn other_resource_types_are_kept() {
        let bundle: FhirBundle = serde_json::from_value(bundle_with_entries(serde_json::json!([
            {"fullUrl": "resource:0", "resource": {"resourceType": "Observation", "status": "final"}},
            {"fullUrl": "resource:1", "resource": {"status": "final"}}
        ])))
        .unwrap();
        assert_eq!(
            bundle.entry[0].parse_resource().unwrap(),
            Resource::Other {
                resource_type: "Observation".into()
            }
        );
        assert_eq!(
            bundle.entry[1].parse_resource().unwrap(),
            Resource::Other {
                resource_type: String::new()
            }
        );
    }

    #[test]
    fn immunization_without_vaccine_code_is_an_error() {
        let value = serde_json::json!({
            "resourceType": "Immunization",
            "patient": {"reference": "resource:0"}
        });
        assert!(Resource::from_value(&value).is_err());
    }
}
