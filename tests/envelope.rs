use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use u_logis::codec::{Envelope, LoadPolicy, TypeRegistry};
use u_logis::models::{Asset, Entity, Identifiable, Person, Schedulable, Segment, Task, TimeInterval};
use u_logis::Error;

fn hours(from: u32, to: u32) -> TimeInterval {
    let day = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
    TimeInterval::new(
        day.and_hms_opt(from, 0, 0).unwrap(),
        day.and_hms_opt(to, 0, 0).unwrap(),
    )
    .unwrap()
}

fn airport_run() -> (Arc<Person>, Arc<Asset>, Task) {
    let steve = Arc::new(
        Person::new("12345", "Steve Winston")
            .with_email("steve.winston@email.com")
            .with_phone_number("123-456-7890"),
    );
    let van = Arc::new(
        Asset::new("a1", "Van")
            .with_description("White delivery van")
            .with_owner(Arc::clone(&steve)),
    );
    let task = Task::new(
        "t1",
        hours(9, 10),
        vec![Arc::clone(&steve)],
        vec!["Drive ".into(), Arc::clone(&van).into(), " to the airport".into()],
    )
    .unwrap();
    (steve, van, task)
}

#[test]
fn description_serializes_as_mixed_sequence() {
    let (_, _, task) = airport_run();
    let value = task.serialize().into_value();

    let description = value["fields"]["description"].as_array().unwrap();
    assert_eq!(description.len(), 3);
    assert_eq!(description[0], json!("Drive "));
    assert_eq!(description[1]["tag"], json!("asset"));
    assert_eq!(description[1]["internal_id"], json!("a1"));
    assert_eq!(description[1]["fields"]["owner"]["tag"], json!("person"));
    assert_eq!(description[2], json!(" to the airport"));
    assert_eq!(
        value["fields"]["start_time"],
        json!({"year": 2016, "month": 1, "day": 1, "hour": 9, "minute": 0})
    );
}

#[test]
fn task_decodes_with_rehydrated_asset_and_owner() {
    let (steve, van, task) = airport_run();
    let registry = TypeRegistry::with_builtin_types();
    let decoded = registry.decode(&task.serialize()).unwrap().into_task().unwrap();

    assert_eq!(*decoded, task);
    assert_eq!(decoded.start_time(), task.start_time());
    assert_eq!(decoded.stop_time(), task.stop_time());

    match &decoded.description()[1] {
        Segment::Asset(asset) => {
            assert_eq!(**asset, *van);
            assert_eq!(asset.description, "White delivery van");
            let owner = asset.owner().unwrap();
            assert_eq!(owner.internal_id(), steve.internal_id());
            assert_eq!(owner.assignments(), steve.assignments());
        }
        other => panic!("expected an asset segment, got {other:?}"),
    }
    assert_eq!(decoded.render(), task.render());
}

#[test]
fn every_variant_round_trips() {
    let (steve, van, task) = airport_run();
    let registry = TypeRegistry::with_builtin_types();

    let person = registry.decode(&steve.serialize()).unwrap().into_person().unwrap();
    assert_eq!(*person, *steve);
    assert_eq!(person.name, steve.name);
    assert_eq!(person.email, steve.email);
    assert_eq!(person.phone_number, steve.phone_number);
    assert_eq!(person.assignments(), steve.assignments());

    let asset = registry.decode(&van.serialize()).unwrap().into_asset().unwrap();
    assert_eq!(*asset, *van);
    assert_eq!(asset.name, van.name);
    assert_eq!(asset.assignments(), van.assignments());

    let entity = registry.decode(&task.serialize()).unwrap();
    assert_eq!(entity.tag(), "task");
    assert_eq!(entity, Entity::from(task));
}

#[test]
fn decoded_participants_keep_persisted_bookings() {
    let (steve, _, task) = airport_run();
    let registry = TypeRegistry::with_builtin_types();
    let decoded = registry.decode(&task.serialize()).unwrap().into_task().unwrap();

    // Decoding does not book again: one assignment, not two.
    assert_eq!(decoded.actors()[0].assignments().len(), 1);
    assert_eq!(steve.assignments().len(), 1);
    assert!(decoded.actors()[0].is_busy(&hours(9, 10)));
}

#[test]
fn envelope_survives_json_storage() {
    let (_, _, task) = airport_run();
    let stored = serde_json::to_string(&task.serialize()).unwrap();
    let envelope: Envelope = serde_json::from_str(&stored).unwrap();

    let registry = TypeRegistry::with_builtin_types().with_load_policy(LoadPolicy::Validate);
    let decoded = registry.decode(&envelope).unwrap().into_task().unwrap();
    assert_eq!(decoded.internal_id(), "t1");
    assert_eq!(decoded.render(), "Drive Van to the airport");
}

#[test]
fn differing_copies_of_one_person_fail_the_decode() {
    let (_, _, task) = airport_run();
    let mut envelope = task.serialize();

    // The van's owner copy of Steve claims two overlapping bookings that
    // the actor copy does not.
    let corrupt = serde_json::to_value(
        Person::new("12345", "Steve Winston")
            .with_email("steve.winston@email.com")
            .with_phone_number("123-456-7890")
            .serialize()
            .with_field(
                "tasks_assigned_to",
                json!([
                    {"tag": "assignment", "internal_id": "x1", "fields": {
                        "start_time": {"year": 2016, "month": 1, "day": 1, "hour": 11, "minute": 0},
                        "stop_time": {"year": 2016, "month": 1, "day": 1, "hour": 13, "minute": 0}}},
                    {"tag": "assignment", "internal_id": "x2", "fields": {
                        "start_time": {"year": 2016, "month": 1, "day": 1, "hour": 12, "minute": 0},
                        "stop_time": {"year": 2016, "month": 1, "day": 1, "hour": 14, "minute": 0}}}
                ]),
            ),
    )
    .unwrap();
    envelope.fields["description"][1]["fields"]["owner"] = corrupt;

    for policy in [LoadPolicy::Trusted, LoadPolicy::Validate] {
        let err = TypeRegistry::with_builtin_types()
            .with_load_policy(policy)
            .decode(&envelope)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedEnvelope { ref tag, ref field, .. } if tag == "person" && field == "internal_id"
        ));
    }
}

#[test]
fn identical_copies_of_one_person_share_a_value() {
    let (_, _, task) = airport_run();
    let decoded = TypeRegistry::with_builtin_types()
        .with_load_policy(LoadPolicy::Validate)
        .decode(&task.serialize())
        .unwrap()
        .into_task()
        .unwrap();

    let owner = decoded.assets()[0].owner().unwrap();
    assert!(Arc::ptr_eq(owner, &decoded.actors()[0]));
}

#[test]
fn sub_minute_booking_reloads_as_zero_length() {
    let day = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
    let at = |s: u32| day.and_hms_opt(1, 0, s).unwrap();
    let steve = Arc::new(Person::new("12345", "Steve Winston"));
    Task::new(
        "T1",
        TimeInterval::new(at(0), at(10)).unwrap(),
        vec![Arc::clone(&steve)],
        vec![],
    )
    .unwrap();
    let t3 = TimeInterval::new(at(5), at(20)).unwrap();
    assert!(steve.is_busy(&t3));

    let reloaded = TypeRegistry::with_builtin_types()
        .decode(&steve.serialize())
        .unwrap()
        .into_person()
        .unwrap();
    let held = reloaded.assignments()[0].interval();
    assert!(held.is_empty());
    assert_eq!(held.start(), at(0));
    assert!(reloaded.is_free(&t3));
}

#[test]
fn unknown_tag_is_rejected_without_touching_registry() {
    let registry = TypeRegistry::with_builtin_types();
    let before = registry.tags().iter().map(|t| t.to_string()).collect::<Vec<_>>();

    let err = registry
        .decode_value(&json!({"tag": "nonexistent_type", "internal_id": "x", "fields": {}}))
        .unwrap_err();
    assert_eq!(
        err,
        Error::UnknownTag {
            tag: "nonexistent_type".into()
        }
    );
    assert_eq!(registry.tags(), before);
}

#[test]
fn unknown_nested_tag_rejects_whole_envelope() {
    let (_, _, task) = airport_run();
    let mut envelope = task.serialize();
    envelope.fields["description"][1]["tag"] = json!("spaceship");

    let err = TypeRegistry::with_builtin_types().decode(&envelope).unwrap_err();
    assert_eq!(
        err,
        Error::UnknownTag {
            tag: "spaceship".into()
        }
    );
}

#[test]
fn missing_fields_are_malformed() {
    let (_, _, task) = airport_run();
    let mut envelope = task.serialize();
    envelope.fields.remove("actors");

    let err = TypeRegistry::with_builtin_types().decode(&envelope).unwrap_err();
    assert!(matches!(
        err,
        Error::MalformedEnvelope { ref tag, ref field, .. } if tag == "task" && field == "actors"
    ));
}

#[test]
fn custom_types_register_beside_builtins() {
    #[derive(Debug)]
    struct Depot {
        id: String,
        city: String,
    }

    impl Identifiable for Depot {
        fn tag(&self) -> &str {
            "depot"
        }

        fn internal_id(&self) -> &str {
            &self.id
        }

        fn serialize(&self) -> Envelope {
            Envelope::new("depot", self.id.as_str()).with_field("city", self.city.as_str())
        }
    }

    let mut registry = TypeRegistry::with_builtin_types();
    registry
        .register("depot", |id, fields, _decoder| {
            let city = fields
                .get("city")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            Ok(Entity::Custom(Arc::new(Depot {
                id: id.to_string(),
                city,
            })))
        })
        .unwrap();

    let depot = Depot {
        id: "d1".into(),
        city: "Seoul".into(),
    };
    let decoded = registry.decode(&depot.serialize()).unwrap();
    assert_eq!(decoded.tag(), "depot");
    assert_eq!(decoded.serialize(), depot.serialize());

    let err = registry
        .register("depot", |_, _, _| Err(Error::UnknownTag { tag: "depot".into() }))
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateTag { .. }));
    assert_eq!(registry.decode(&depot.serialize()).unwrap().serialize(), depot.serialize());
}
