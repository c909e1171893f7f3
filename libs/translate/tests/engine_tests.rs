//! End-to-end engine tests over an in-memory store and a recording registry.

use async_trait::async_trait;
use bridge_registry::{
    Enrollment, Event, MetadataKind, RegistryClient, RegistryResponse, TrackedEntity,
};
use bridge_store::{Collection, DocumentStore, MemoryDocumentStore};
use bridge_translate::{
    Cardinality, EncounterMirror, EnrollmentMirror, Error, SubjectMirror, TranslationService,
};
use serde_json::{json, Value as JsonValue};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    NewIdentifier,
    CreateSubject(TrackedEntity),
    CreateEnrollment(Enrollment),
    CreateEvent(Event),
    UpdateDataValue {
        event_id: String,
        data_element: String,
        value: String,
    },
}

/// Registry fake that records every call and answers with a fixed status.
struct RecordingRegistry {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicUsize,
    subject_status: u16,
}

impl RecordingRegistry {
    fn new() -> Self {
        Self::with_subject_status(200)
    }

    fn with_subject_status(subject_status: u16) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(1),
            subject_status,
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn ok(&self, status: u16) -> RegistryResponse {
        RegistryResponse {
            status,
            body: json!({"httpStatusCode": status}),
        }
    }
}

#[async_trait]
impl RegistryClient for RecordingRegistry {
    async fn new_identifier(&self) -> bridge_registry::Result<String> {
        self.record(Call::NewIdentifier);
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(format!("id-{n}"))
    }

    async fn create_subject(
        &self,
        subject: &TrackedEntity,
    ) -> bridge_registry::Result<RegistryResponse> {
        self.record(Call::CreateSubject(subject.clone()));
        Ok(self.ok(self.subject_status))
    }

    async fn create_enrollment(
        &self,
        enrollment: &Enrollment,
    ) -> bridge_registry::Result<RegistryResponse> {
        self.record(Call::CreateEnrollment(enrollment.clone()));
        Ok(self.ok(200))
    }

    async fn create_event(&self, event: &Event) -> bridge_registry::Result<RegistryResponse> {
        self.record(Call::CreateEvent(event.clone()));
        Ok(self.ok(200))
    }

    async fn update_event_data_value(
        &self,
        event: &Event,
        event_id: &str,
        data_element: &str,
    ) -> bridge_registry::Result<RegistryResponse> {
        self.record(Call::UpdateDataValue {
            event_id: event_id.to_string(),
            data_element: data_element.to_string(),
            value: event
                .data_values
                .first()
                .map(|dv| dv.value.clone())
                .unwrap_or_default(),
        });
        Ok(self.ok(200))
    }

    async fn metadata(&self, _kind: MetadataKind) -> bridge_registry::Result<JsonValue> {
        Ok(JsonValue::Null)
    }
}

/// Store seeded with the reference data the test documents resolve against.
async fn seeded_store() -> Arc<MemoryDocumentStore> {
    let store = Arc::new(MemoryDocumentStore::new());
    store
        .put(
            Collection::Attributes,
            "attr-nin",
            json!({
                "name": "National ID",
                "identifier": true,
                "mappings": [
                    {"system": "urn:nin", "code": "NIN"},
                    {"system": "DHIS2", "code": "ATTR_NIN"}
                ]
            }),
        )
        .await
        .unwrap();
    store
        .put(
            Collection::Attributes,
            "attr-birthdate",
            json!({
                "name": "Date of birth",
                "type": "birthDate",
                "mappings": [{"system": "DHIS2", "code": "ATTR_BD"}]
            }),
        )
        .await
        .unwrap();
    store
        .put(
            Collection::OrgUnits,
            "ou-f001",
            json!({
                "name": "District Clinic",
                "mappings": [
                    {"system": "urn:facility", "code": "F-001"},
                    {"system": "DHIS2", "code": "OU1"}
                ]
            }),
        )
        .await
        .unwrap();
    store
        .put(
            Collection::EntityTypes,
            "te-person",
            json!({
                "name": "Person",
                "type": "Person",
                "mappings": [{"system": "DHIS2", "code": "TE1"}]
            }),
        )
        .await
        .unwrap();
    store
        .put(
            Collection::Programs,
            "prog-hiv",
            json!({
                "name": "HIV care",
                "mappings": [
                    {"system": "urn:program", "code": "HIV"},
                    {"system": "DHIS2", "code": "P1"}
                ]
            }),
        )
        .await
        .unwrap();
    store
        .put(
            Collection::Stages,
            "stage-anc1",
            json!({
                "name": "First visit",
                "repeatable": false,
                "program": {"id": "P1"},
                "mappings": [
                    {"system": "urn:visit", "code": "ANC1"},
                    {"system": "DHIS2", "code": "PS1"}
                ]
            }),
        )
        .await
        .unwrap();
    store
        .put(
            Collection::DataElements,
            "de-height",
            json!({
                "name": "Body height",
                "valueType": "NUMBER",
                "mappings": [
                    {"system": "urn:loinc", "code": "8302-2"},
                    {"system": "DHIS2", "code": "DE1"}
                ]
            }),
        )
        .await
        .unwrap();
    store
}

fn service(
    store: Arc<MemoryDocumentStore>,
    registry: Arc<RecordingRegistry>,
) -> TranslationService {
    TranslationService::new(store, registry)
}

fn patient_doc() -> JsonValue {
    json!({
        "resourceType": "Patient",
        "identifier": [{
            "type": {"coding": [{"system": "urn:nin", "code": "NIN"}]},
            "value": "A1"
        }],
        "name": [{"family": "Okello", "given": ["Grace"]}],
        "gender": "female",
        "birthDate": "1990-05-17",
        "managingOrganization": {
            "identifier": {"system": "urn:facility", "value": "F-001"}
        }
    })
}

fn episode_doc() -> JsonValue {
    json!({
        "resourceType": "EpisodeOfCare",
        "identifier": [{
            "type": {"coding": [{"system": "urn:program", "code": "HIV"}]}
        }],
        "patient": {"identifier": {"system": "urn:nin", "value": "A1"}},
        "period": {"start": "2021-03-01T09:30:00Z"}
    })
}

fn encounter_doc() -> JsonValue {
    json!({
        "resourceType": "Encounter",
        "identifier": [{"value": "enc-1"}],
        "type": [{"coding": [{"system": "urn:visit", "code": "ANC1"}]}],
        "subject": {"identifier": {"system": "urn:nin", "value": "A1"}},
        "period": {"start": "2021-03-02"}
    })
}

fn observation_doc() -> JsonValue {
    json!({
        "resourceType": "Observation",
        "code": {"coding": [{"system": "urn:loinc", "code": "8302-2"}]},
        "subject": {"identifier": {"system": "urn:nin", "value": "A1"}},
        "encounter": {"identifier": {"value": "enc-1"}},
        "valueQuantity": {"value": 162.0, "unit": "cm"}
    })
}

async fn stored_mirror(store: &MemoryDocumentStore, id: &str) -> SubjectMirror {
    let document = store
        .get(Collection::Subjects, id)
        .await
        .unwrap()
        .expect("mirror stored");
    serde_json::from_value(document).unwrap()
}

#[tokio::test]
async fn patient_becomes_tracked_entity_with_mapped_attributes() {
    let store = seeded_store().await;
    let registry = Arc::new(RecordingRegistry::new());
    let service = service(store.clone(), registry.clone());

    let patient = serde_json::from_value(patient_doc()).unwrap();
    service.translate_patient(&patient).await.unwrap();

    let calls = registry.calls();
    assert_eq!(calls[0], Call::NewIdentifier);
    let Call::CreateSubject(subject) = &calls[1] else {
        panic!("expected subject submission, got {calls:?}");
    };
    assert_eq!(subject.tracked_entity_instance, "id-1");
    assert_eq!(subject.org_unit, "OU1");
    assert_eq!(subject.tracked_entity_type, "TE1");

    let attribute = |code: &str| {
        subject
            .attributes
            .iter()
            .find(|a| a.attribute == code)
            .map(|a| a.value.as_str())
    };
    assert_eq!(attribute("ATTR_NIN"), Some("A1"));
    assert_eq!(attribute("ATTR_BD"), Some("1990-05-17"));
    // Fields without a mapped attribute are dropped silently.
    assert_eq!(subject.attributes.len(), 2);

    let mirror = stored_mirror(&store, "id-1").await;
    assert_eq!(mirror.identifiers, vec!["A1"]);
    assert_eq!(mirror.org_unit, "OU1");
}

#[tokio::test]
async fn resubmitted_patient_keeps_its_registry_identifier() {
    let store = seeded_store().await;
    let registry = Arc::new(RecordingRegistry::new());
    let service = service(store.clone(), registry.clone());

    let patient = serde_json::from_value(patient_doc()).unwrap();
    service.translate_patient(&patient).await.unwrap();
    service.translate_patient(&patient).await.unwrap();

    let identifier_calls = registry
        .calls()
        .iter()
        .filter(|c| **c == Call::NewIdentifier)
        .count();
    assert_eq!(identifier_calls, 1);

    let subjects: Vec<_> = registry
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::CreateSubject(s) => Some(s.tracked_entity_instance),
            _ => None,
        })
        .collect();
    assert_eq!(subjects, vec!["id-1", "id-1"]);
}

#[tokio::test]
async fn subject_conflict_is_treated_as_success() {
    let store = seeded_store().await;
    let registry = Arc::new(RecordingRegistry::with_subject_status(409));
    let service = service(store.clone(), registry.clone());

    let patient = serde_json::from_value(patient_doc()).unwrap();
    service.translate_patient(&patient).await.unwrap();

    let mirror = stored_mirror(&store, "id-1").await;
    assert_eq!(mirror.identifiers, vec!["A1"]);
}

#[tokio::test]
async fn patient_without_mapped_org_unit_fails_validation() {
    let store = seeded_store().await;
    let registry = Arc::new(RecordingRegistry::new());
    let service = service(store.clone(), registry.clone());

    let mut doc = patient_doc();
    doc["managingOrganization"]["identifier"]["value"] = json!("F-999");
    let patient = serde_json::from_value(doc).unwrap();

    let error = service.translate_patient(&patient).await.unwrap_err();
    assert!(matches!(error, Error::Validation(_)), "got {error:?}");
    assert!(registry.calls().is_empty());
}

#[tokio::test]
async fn episode_enrolls_a_known_subject() {
    let store = seeded_store().await;
    let registry = Arc::new(RecordingRegistry::new());
    let service = service(store.clone(), registry.clone());

    let patient = serde_json::from_value(patient_doc()).unwrap();
    service.translate_patient(&patient).await.unwrap();

    let episode = serde_json::from_value(episode_doc()).unwrap();
    service.translate_episode(&episode).await.unwrap();

    let enrollment = registry
        .calls()
        .into_iter()
        .find_map(|c| match c {
            Call::CreateEnrollment(e) => Some(e),
            _ => None,
        })
        .expect("enrollment submitted");
    assert_eq!(enrollment.tracked_entity_instance, "id-1");
    assert_eq!(enrollment.program, "P1");
    assert_eq!(enrollment.org_unit, "OU1");
    assert_eq!(enrollment.enrollment_date, "2021-03-01");

    let mirror = stored_mirror(&store, "id-1").await;
    assert!(matches!(
        mirror.enrollment_for_program("P1"),
        Cardinality::One(_)
    ));
}

#[tokio::test]
async fn duplicate_enrollment_makes_no_registry_call() {
    let store = seeded_store().await;
    let registry = Arc::new(RecordingRegistry::new());
    let service = service(store.clone(), registry.clone());

    let mirror = SubjectMirror::new("tei-1", "OU1", "TE1", vec!["A1".to_string()])
        .with_enrollment(EnrollmentMirror {
            id: "en-1".to_string(),
            program: "P1".to_string(),
            org_unit: "OU1".to_string(),
            enrollment_date: "2021-03-01".to_string(),
            incident_date: "2021-03-01".to_string(),
        });
    store
        .put(
            Collection::Subjects,
            "tei-1",
            serde_json::to_value(&mirror).unwrap(),
        )
        .await
        .unwrap();

    let episode = serde_json::from_value(episode_doc()).unwrap();
    let error = service.translate_episode(&episode).await.unwrap_err();
    assert!(matches!(error, Error::Duplicate(_)), "got {error:?}");
    assert!(registry.calls().is_empty());

    let unchanged = stored_mirror(&store, "tei-1").await;
    assert_eq!(unchanged, mirror);
}

#[tokio::test]
async fn episode_for_unknown_subject_is_not_found() {
    let store = seeded_store().await;
    let registry = Arc::new(RecordingRegistry::new());
    let service = service(store.clone(), registry.clone());

    let episode = serde_json::from_value(episode_doc()).unwrap();
    let error = service.translate_episode(&episode).await.unwrap_err();
    assert!(matches!(error, Error::NotFound(_)), "got {error:?}");
}

#[tokio::test]
async fn encounter_requires_exactly_one_enrollment() {
    let store = seeded_store().await;
    let registry = Arc::new(RecordingRegistry::new());
    let service = service(store.clone(), registry.clone());

    let base = SubjectMirror::new("tei-1", "OU1", "TE1", vec!["A1".to_string()]);
    store
        .put(
            Collection::Subjects,
            "tei-1",
            serde_json::to_value(&base).unwrap(),
        )
        .await
        .unwrap();

    let encounter: bridge_models::Encounter =
        serde_json::from_value(encounter_doc()).unwrap();
    let error = service.translate_encounter(&encounter).await.unwrap_err();
    assert!(matches!(error, Error::NotFound(_)), "got {error:?}");

    let two = |id: &str| EnrollmentMirror {
        id: id.to_string(),
        program: "P1".to_string(),
        org_unit: "OU1".to_string(),
        enrollment_date: format!("2021-0{}-01", if id == "en-1" { 1 } else { 2 }),
        incident_date: "2021-01-01".to_string(),
    };
    let ambiguous = base
        .with_enrollment(two("en-1"))
        .with_enrollment(two("en-2"));
    store
        .put(
            Collection::Subjects,
            "tei-1",
            serde_json::to_value(&ambiguous).unwrap(),
        )
        .await
        .unwrap();

    let error = service.translate_encounter(&encounter).await.unwrap_err();
    assert!(matches!(error, Error::NotFound(_)), "got {error:?}");
    assert!(registry.calls().is_empty());
}

#[tokio::test]
async fn non_repeatable_stage_rejects_a_second_encounter() {
    let store = seeded_store().await;
    let registry = Arc::new(RecordingRegistry::new());
    let service = service(store.clone(), registry.clone());

    let patient = serde_json::from_value(patient_doc()).unwrap();
    service.translate_patient(&patient).await.unwrap();
    let episode = serde_json::from_value(episode_doc()).unwrap();
    service.translate_episode(&episode).await.unwrap();

    let encounter: bridge_models::Encounter =
        serde_json::from_value(encounter_doc()).unwrap();
    service.translate_encounter(&encounter).await.unwrap();

    let mut second = encounter_doc();
    second["identifier"][0]["value"] = json!("enc-2");
    let second: bridge_models::Encounter = serde_json::from_value(second).unwrap();
    let error = service.translate_encounter(&second).await.unwrap_err();
    assert!(matches!(error, Error::Duplicate(_)), "got {error:?}");

    let events = registry
        .calls()
        .iter()
        .filter(|c| matches!(c, Call::CreateEvent(_)))
        .count();
    assert_eq!(events, 1);
}

#[tokio::test]
async fn observation_merges_one_value_into_its_event() {
    let store = seeded_store().await;
    let registry = Arc::new(RecordingRegistry::new());
    let service = service(store.clone(), registry.clone());

    let mirror = SubjectMirror::new("tei-1", "OU1", "TE1", vec!["A1".to_string()])
        .with_encounter(EncounterMirror {
            id: "ev-1".to_string(),
            program: "P1".to_string(),
            program_stage: "PS1".to_string(),
            enrollment: "en-1".to_string(),
            org_unit: "OU1".to_string(),
            event_date: "2021-03-02".to_string(),
            source_reference: "enc-1".to_string(),
        });
    store
        .put(
            Collection::Subjects,
            "tei-1",
            serde_json::to_value(&mirror).unwrap(),
        )
        .await
        .unwrap();

    let observation = serde_json::from_value(observation_doc()).unwrap();
    service.translate_observation(&observation).await.unwrap();

    assert_eq!(
        registry.calls(),
        vec![Call::UpdateDataValue {
            event_id: "ev-1".to_string(),
            data_element: "DE1".to_string(),
            value: "162".to_string(),
        }]
    );

    // The mirror is untouched; the registry owns data values.
    assert_eq!(stored_mirror(&store, "tei-1").await, mirror);
}

#[tokio::test]
async fn observation_without_event_or_mapping_is_not_found() {
    let store = seeded_store().await;
    let registry = Arc::new(RecordingRegistry::new());
    let service = service(store.clone(), registry.clone());

    store
        .put(
            Collection::Subjects,
            "tei-1",
            serde_json::to_value(SubjectMirror::new(
                "tei-1",
                "OU1",
                "TE1",
                vec!["A1".to_string()],
            ))
            .unwrap(),
        )
        .await
        .unwrap();

    let observation = serde_json::from_value(observation_doc()).unwrap();
    let error = service.translate_observation(&observation).await.unwrap_err();
    assert!(matches!(error, Error::NotFound(_)), "got {error:?}");
    assert!(registry.calls().is_empty());
}

#[tokio::test]
async fn bundle_entries_run_in_order_and_report_per_entry() {
    let store = seeded_store().await;
    let registry = Arc::new(RecordingRegistry::new());
    let service = service(store.clone(), registry.clone());

    let bundle = json!({
        "resourceType": "Bundle",
        "entry": [
            {"resource": patient_doc()},
            {"resource": episode_doc()},
            {"resource": encounter_doc()},
            {"resource": observation_doc()},
            {"resource": {"resourceType": "Medication"}}
        ]
    });

    let outcome = service.translate_value(bundle).await;
    let responses = outcome["responses"].as_array().expect("responses array");
    assert_eq!(responses.len(), 5);

    // Each entry found the state its predecessors created.
    for response in &responses[..4] {
        assert!(
            response.get("error").is_none(),
            "unexpected error outcome: {response}"
        );
    }
    assert_eq!(
        responses[4]["error"],
        "unsupported resource type Medication"
    );

    let mirror = stored_mirror(&store, "id-1").await;
    assert_eq!(mirror.enrollments.len(), 1);
    assert_eq!(mirror.encounters.len(), 1);
    assert_eq!(mirror.encounters[0].source_reference, "enc-1");
}

#[tokio::test]
async fn extension_resolution_requires_an_extension_concept() {
    let store = seeded_store().await;
    store
        .put(
            Collection::Attributes,
            "attr-nationality",
            json!({
                "name": "Nationality",
                "type": "extension",
                "mappings": [
                    {"system": "http://example.org/nationality", "code": "nationality"},
                    {"system": "DHIS2", "code": "ATTR_NAT"}
                ]
            }),
        )
        .await
        .unwrap();
    // Same shape, same kind of URL system, but not tagged as an extension.
    store
        .put(
            Collection::Attributes,
            "attr-occupation",
            json!({
                "name": "Occupation",
                "mappings": [
                    {"system": "http://example.org/occupation", "code": "occupation"},
                    {"system": "DHIS2", "code": "ATTR_OCC"}
                ]
            }),
        )
        .await
        .unwrap();
    let registry = Arc::new(RecordingRegistry::new());
    let service = service(store.clone(), registry.clone());

    let mut doc = patient_doc();
    doc["extension"] = json!([
        {"url": "http://example.org/nationality", "valueString": "UG"},
        {"url": "http://example.org/occupation", "valueString": "farmer"}
    ]);
    let patient = serde_json::from_value(doc).unwrap();
    service.translate_patient(&patient).await.unwrap();

    let Call::CreateSubject(subject) = &registry.calls()[1] else {
        panic!("expected subject submission");
    };
    let attribute = |code: &str| {
        subject
            .attributes
            .iter()
            .find(|a| a.attribute == code)
            .map(|a| a.value.as_str())
    };
    assert_eq!(attribute("ATTR_NAT"), Some("UG"));
    assert_eq!(attribute("ATTR_OCC"), None);
}

#[tokio::test]
async fn any_identifier_value_addresses_the_same_subject() {
    let store = seeded_store().await;
    store
        .put(
            Collection::Attributes,
            "attr-passport",
            json!({
                "name": "Passport number",
                "identifier": true,
                "mappings": [
                    {"system": "urn:passport", "code": "PP"},
                    {"system": "DHIS2", "code": "ATTR_PP"}
                ]
            }),
        )
        .await
        .unwrap();
    let registry = Arc::new(RecordingRegistry::new());
    let service = service(store.clone(), registry.clone());

    let mut doc = patient_doc();
    doc["identifier"].as_array_mut().unwrap().push(json!({
        "type": {"coding": [{"system": "urn:passport", "code": "PP"}]},
        "value": "P7"
    }));
    let patient = serde_json::from_value(doc).unwrap();
    service.translate_patient(&patient).await.unwrap();

    // A later document naming only the secondary identifier still resolves
    // to the subject created above.
    let mut second = patient_doc();
    second["identifier"] = json!([{
        "type": {"coding": [{"system": "urn:passport", "code": "PP"}]},
        "value": "P7"
    }]);
    let second = serde_json::from_value(second).unwrap();
    service.translate_patient(&second).await.unwrap();

    let identifier_calls = registry
        .calls()
        .iter()
        .filter(|c| **c == Call::NewIdentifier)
        .count();
    assert_eq!(identifier_calls, 1);

    let mirror = stored_mirror(&store, "id-1").await;
    assert!(mirror.identifiers.contains(&"A1".to_string()));
    assert!(mirror.identifiers.contains(&"P7".to_string()));
}

#[tokio::test]
async fn nested_bundles_recurse() {
    let store = seeded_store().await;
    let registry = Arc::new(RecordingRegistry::new());
    let service = service(store.clone(), registry.clone());

    let bundle = json!({
        "resourceType": "Bundle",
        "entry": [{
            "resource": {
                "resourceType": "Bundle",
                "entry": [{"resource": patient_doc()}]
            }
        }]
    });

    let outcome = service.translate_value(bundle).await;
    let inner = &outcome["responses"][0]["responses"][0];
    assert!(inner.get("error").is_none(), "got {inner}");
    assert_eq!(stored_mirror(&store, "id-1").await.identifiers, vec!["A1"]);
}
