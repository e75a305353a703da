//! Shared test data: the payload of the SMART Health Cards example card.

pub(crate) const EXAMPLE_PAYLOAD: &str = concat!(
    r#"{"iss":"https://spec.smarthealth.cards/examples/issuer","nbf":1628099964.297,"#,
    r#""vc":{"type":["https://smarthealth.cards#health-card","https://smarthealth.cards#immunization","#,
    r#""https://smarthealth.cards#covid19"],"credentialSubject":{"fhirVersion":"4.0.1","fhirBundle":"#,
    r#"{"resourceType":"Bundle","type":"collection","entry":[{"fullUrl":"resource:0","resource":"#,
    r#"{"resourceType":"Patient","name":[{"family":"Anyperson","given":["John","B."]}],"#,
    r#""birthDate":"1951-01-20"}},{"fullUrl":"resource:1","resource":{"resourceType":"Immunization","#,
    r#""status":"completed","vaccineCode":{"coding":[{"system":"http://hl7.org/fhir/sid/cvx","code":"#,
    r#""207"}]},"patient":{"reference":"resource:0"},"occurrenceDateTime":"2021-01-01","performer":[{"#,
    r#""actor":{"display":"ABC General Hospital"}}],"lotNumber":"0000001"}},{"fullUrl":"resource:2","#,
    r#""resource":{"resourceType":"Immunization","status":"completed","vaccineCode":{"coding":[{"system""#,
    r#":"http://hl7.org/fhir/sid/cvx","code":"207"}]},"patient":{"reference":"resource:0"},"#,
    r#""occurrenceDateTime":"2021-01-29","performer":[{"actor":{"display":"ABC General Hospital"}}],"#,
    r#""lotNumber":"0000007"}}]}}}}"#
);

/// The example bundle with its entries replaced.
pub(crate) fn bundle_with_entries(entries: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "resourceType": "Bundle",
        "type": "collection",
        "entry": entries,
    })
}

pub(crate) fn patient_entry(full_url: &str) -> serde_json::Value {
    serde_json::json!({
        "fullUrl": full_url,
        "resource": {
            "resourceType": "Patient",
            "name": [{"family": "Anyperson", "given": ["John", "B."]}],
            "birthDate": "1951-01-20"
        }
    })
}

pub(crate) fn immunization_entry(full_url: &str, patient_ref: &str, date: &str) -> serde_json::Value {
    serde_json::json!({
        "fullUrl": full_url,
        "resource": {
            "resourceType": "Immunization",
            "status": "completed",
            "vaccineCode": {"coding": [{"system": "http://hl7.org/fhir/sid/cvx", "code": "208"}]},
            "patient": {"reference": patient_ref},
            "occurrenceDateTime": date,
            "performer": [{"actor": {"display": "City Clinic"}}]
        }
    })
}
