//! # Card Summary
//!
//! Flattens an immunization bundle into the fields printed by `shc extract`:
//! patient name and birth date followed by date, performer, and vaccine of
//! the first two doses.
//!
//! The bundle must hold exactly one Patient and one or more Immunizations,
//! each referring to that Patient. Any other resource type is rejected.

use crate::error::SummaryError;
use crate::fhir::{FhirBundle, Immunization, Patient, Resource};
use crate::vaccine::VaccineRegistry;

/// Performer text used when an immunization names none.
pub const UNKNOWN_PERFORMER: &str = "UNKNOWN PERFORMER";

/// Doses included in [`CardSummary::tsv_fields`].
const TSV_DOSES: usize = 2;

/// One administered dose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoseSummary {
    /// Occurrence date as written in the bundle.
    pub date: String,
    /// Performer display text, or [`UNKNOWN_PERFORMER`].
    pub performer: String,
    /// Vaccine name from the registry.
    pub vaccine: String,
    /// Lot number, if recorded.
    pub lot_number: Option<String>,
}

/// The summary of one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSummary {
    /// Given names joined with spaces.
    pub given: String,
    /// Family name.
    pub family: String,
    /// Birth date as written in the bundle.
    pub birth_date: String,
    /// Doses in bundle order.
    pub doses: Vec<DoseSummary>,
}

impl CardSummary {
    /// Summarize a bundle.
    pub fn from_bundle(
        bundle: &FhirBundle,
        registry: &VaccineRegistry,
    ) -> Result<Self, SummaryError> {
        let mut patient: Option<Patient> = None;
        let mut immunizations: Vec<Immunization> = Vec::new();

        for entry in &bundle.entry {
            let resource =
                entry
                    .parse_resource()
                    .map_err(|source| SummaryError::InvalidResource {
                        resource_type: entry.resource_type().unwrap_or_default().to_string(),
                        source,
                    })?;
            match resource {
                Resource::Patient(p) => {
                    if patient.is_some() {
                        return Err(SummaryError::MultiplePatients);
                    }
                    patient = Some(p);
                }
                Resource::Immunization(imm) => immunizations.push(*imm),
                Resource::Other { resource_type } => {
                    return Err(SummaryError::UnsupportedResource(resource_type));
                }
            }
        }

        let patient = patient.ok_or(SummaryError::NoPatient)?;
        if immunizations.is_empty() {
            return Err(SummaryError::NoImmunizations);
        }

        // With a single Patient in the bundle, any reference resolving to a
        // Patient entry resolves to the bundle patient.
        for (i, imm) in immunizations.iter().enumerate() {
            let reference = imm.patient.reference.as_deref();
            let resolves_to_patient = reference
                .and_then(|r| bundle.resolve_reference(r))
                .and_then(|e| e.resource_type())
                == Some("Patient");
            if !resolves_to_patient {
                return Err(SummaryError::PatientMismatch {
                    index: i + 1,
                    reference: reference.map(str::to_string),
                });
            }
        }

        let name = patient
            .name
            .first()
            .ok_or(SummaryError::MissingField("patient name"))?;
        let doses = immunizations
            .iter()
            .map(|imm| dose_summary(imm, registry))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            given: name.given.join(" "),
            family: name
                .family
                .clone()
                .ok_or(SummaryError::MissingField("patient family name"))?,
            birth_date: patient
                .birth_date
                .clone()
                .ok_or(SummaryError::MissingField("patient birth date"))?,
            doses,
        })
    }

    /// Patient fields followed by date, performer, and vaccine of the first
    /// two doses.
    pub fn tsv_fields(&self) -> Vec<String> {
        let mut fields = vec![
            self.given.clone(),
            self.family.clone(),
            self.birth_date.clone(),
        ];
        for dose in self.doses.iter().take(TSV_DOSES) {
            fields.push(dose.date.clone());
            fields.push(dose.performer.clone());
            fields.push(dose.vaccine.clone());
        }
        fields
    }
}

fn dose_summary(
    imm: &Immunization,
    registry: &VaccineRegistry,
) -> Result<DoseSummary, SummaryError> {
    let date = imm
        .occurrence_date_time
        .clone()
        .ok_or(SummaryError::MissingField("immunization occurrenceDateTime"))?;
    let performer = imm
        .performer
        .first()
        .and_then(|p| p.actor.display.clone())
        .unwrap_or_else(|| UNKNOWN_PERFORMER.to_string());
    let coding = imm
        .vaccine_code
        .coding
        .first()
        .ok_or(SummaryError::MissingField("immunization vaccineCode coding"))?;
    Ok(DoseSummary {
        date,
        performer,
        vaccine: registry.human_readable(coding),
        lot_number: imm.lot_number.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{bundle_with_entries, immunization_entry, patient_entry, EXAMPLE_PAYLOAD};
    use serde_json::json;

    fn bundle(entries: serde_json::Value) -> FhirBundle {
        serde_json::from_value(bundle_with_entries(entries)).unwrap()
    }

    fn summarize(entries: serde_json::Value) -> Result<CardSummary, SummaryError> {
        CardSummary::from_bundle(&bundle(entries), &VaccineRegistry::default())
    }

    #[test]
    fn summarizes_example_card() {
        let payload: serde_json::Value = serde_json::from_str(EXAMPLE_PAYLOAD).unwrap();
        let bundle: FhirBundle =
            serde_json::from_value(payload["vc"]["credentialSubject"]["fhirBundle"].clone())
                .unwrap();
        let summary = CardSummary::from_bundle(&bundle, &VaccineRegistry::default()).unwrap();

        assert_eq!(
            summary.tsv_fields(),
            vec![
                "John B.",
                "Anyperson",
                "1951-01-20",
                "2021-01-01",
                "ABC General Hospital",
                "Moderna COVID-19 Vaccine",
                "2021-01-29",
                "ABC General Hospital",
                "Moderna COVID-19 Vaccine",
            ]
        );
        assert_eq!(summary.doses[1].lot_number.as_deref(), Some("0000007"));
    }

    #[test]
    fn only_first_two_doses_are_listed() {
        let summary = summarize(json!([
            patient_entry("resource:0"),
            immunization_entry("resource:1", "resource:0", "2021-04-01"),
            immunization_entry("resource:2", "resource:0", "2021-04-22"),
            immunization_entry("resource:3", "resource:0", "2021-11-30"),
        ]))
        .unwrap();
        assert_eq!(summary.doses.len(), 3);
        let fields = summary.tsv_fields();
        assert_eq!(fields.len(), 9);
        assert_eq!(fields[6], "2021-04-22");
    }

    #[test]
    fn single_dose_has_six_fields() {
        let summary = summarize(json!([
            patient_entry("resource:0"),
            immunization_entry("resource:1", "resource:0", "2021-04-01"),
        ]))
        .unwrap();
        let fields = summary.tsv_fields();
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[4], "City Clinic");
        assert_eq!(fields[5], "Pfizer COVID-19 Vaccine");
    }

    #[test]
    fn missing_performer_is_unknown() {
        let mut imm = immunization_entry("resource:1", "resource:0", "2021-04-01");
        imm["resource"]
            .as_object_mut()
            .unwrap()
            .remove("performer");
        let summary = summarize(json!([patient_entry("resource:0"), imm])).unwrap();
        assert_eq!(summary.doses[0].performer, UNKNOWN_PERFORMER);
    }

    #[test]
    fn rejects_bundle_without_patient() {
        let err = summarize(json!([immunization_entry("resource:1", "resource:0", "2021-04-01")]))
            .unwrap_err();
        assert!(matches!(err, SummaryError::NoPatient));
    }

    #[test]
    fn rejects_two_patients() {
        let err = summarize(json!([patient_entry("resource:0"), patient_entry("resource:1")]))
            .unwrap_err();
        assert!(matches!(err, SummaryError::MultiplePatients));
    }

    #[test]
    fn rejects_bundle_without_immunizations() {
        let err = summarize(json!([patient_entry("resource:0")])).unwrap_err();
        assert!(matches!(err, SummaryError::NoImmunizations));
    }

    #[test]
    fn rejects_other_resource_types() {
        let err = summarize(json!([
            patient_entry("resource:0"),
            {"fullUrl": "resource:1", "resource": {"resourceType": "Observation"}},
        ]))
        .unwrap_err();
        assert!(matches!(err, SummaryError::UnsupportedResource(t) if t == "Observation"));
    }

    #[test]
    fn rejects_immunization_for_another_patient() {
        let err = summarize(json!([
            patient_entry("resource:0"),
            immunization_entry("resource:1", "resource:0", "2021-04-01"),
            immunization_entry("resource:2", "resource:7", "2021-04-22"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            SummaryError::PatientMismatch { index: 2, reference: Some(ref r) } if r == "resource:7"
        ));
    }

    #[test]
    fn rejects_immunization_pointing_at_itself() {
        let err = summarize(json!([
            patient_entry("resource:0"),
            immunization_entry("resource:1", "resource:1", "2021-04-01"),
        ]))
        .unwrap_err();
        assert!(matches!(err, SummaryError::PatientMismatch { index: 1, .. }));
    }
}
