use pretty_assertions::assert_eq;
use tests::prelude::*;

fn property_configuration() {
    let mut builder = models!(pickle().scalar("Size", Type::I16.nullable()));

    builder
        .entity("Pickle")
        .unwrap()
        .property("Size", Type::I16.nullable())
        .unwrap()
        .nullable(false)
        .unwrap()
        .concurrency_token(true)
        .unwrap()
        .value_generated(ValueGenerated::OnAddOrUpdate)
        .unwrap()
        .annotation("column", "pickle_size")
        .unwrap();

    let model = builder.build().unwrap();
    let pickle = model.entity_type(entity(&model, "Pickle"));
    let size = pickle.property_by_name("Size").unwrap();

    assert_eq!(size.source(), Provenance::Explicit);
    assert!(!size.is_nullable());
    assert_eq!(size.nullable_source(), Some(Provenance::Explicit));
    assert!(size.is_concurrency_token());
    assert_eq!(size.value_generated(), ValueGenerated::OnAddOrUpdate);
    assert_eq!(
        size.annotations().get("column").map(String::as_str),
        Some("pickle_size")
    );
}

fn non_nullable_property_cannot_become_nullable() {
    let mut builder = models!(pickle());

    let mut pickle = builder.entity("Pickle").unwrap();
    let mut weight = pickle.property("Weight", Type::I32).unwrap();

    let err = weight.nullable(true).unwrap_err();
    assert!(err.is_cannot_be_nullable());
}

fn conflicting_property_type_is_rejected() {
    let mut builder = models!(pickle().scalar("Size", Type::I16));

    let err = builder
        .entity("Pickle")
        .unwrap()
        .property("Size", Type::String)
        .unwrap_err();
    assert!(err.is_shape_mismatch());
}

fn explicit_primary_key() {
    let mut builder = models!(pickle().scalar("Code", Type::String));

    builder
        .entity("Pickle")
        .unwrap()
        .key(&["Code"])
        .unwrap()
        .annotation("name", "pk_pickle")
        .unwrap();

    let model = builder.build().unwrap();
    let pickle = model.entity_type(entity(&model, "Pickle"));
    let key = pickle.primary_key().unwrap();

    assert_eq!(names(&model, key.properties()), ["Code"]);
    assert_eq!(pickle.primary_key_source(), Some(Provenance::Explicit));
    assert_eq!(key.annotations().get("name").map(String::as_str), Some("pk_pickle"));

    // The discovered key was not referenced and is dropped
    assert_eq!(pickle.keys().count(), 1);
}

fn primary_key_change_moves_relationships() {
    let mut builder = models!(big_mak().scalar("Code", Type::String), pickle());

    builder.entity("BigMak").unwrap().key(&["Code"]).unwrap();

    let model = builder.build().unwrap();
    let big_mak = model.entity_type(entity(&model, "BigMak"));
    let pickle = model.entity_type(entity(&model, "Pickle"));
    let fk = model.foreign_keys().next().unwrap();

    assert_eq!(fk.principal_key(), big_mak.primary_key().unwrap().id());
    assert_eq!(names(&model, fk.properties()), ["BigMakCode"]);
    assert_eq!(
        model.property(fk.properties()[0]).ty(),
        Type::String.nullable()
    );
    assert!(pickle.property_by_name("BigMakId").is_none());
    assert_eq!(big_mak.keys().count(), 1);
}

fn unknown_key_property_is_rejected() {
    let mut builder = models!(pickle());

    let err = builder
        .entity("Pickle")
        .unwrap()
        .key(&["Crunch"])
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(err.to_string(), "invalid argument: unknown property `Crunch` on `Pickle`");
}

fn alternate_keys_and_indexes() {
    let mut builder = models!(pickle()
        .scalar("Code", Type::String)
        .scalar("Size", Type::I16));

    let mut pickle = builder.entity("Pickle").unwrap();
    let alternate = pickle.alternate_key(&["Code"]).unwrap().id();
    let index = pickle.index(&["Size"], true).unwrap();

    // Repeating an index settles on the same one
    assert_eq!(pickle.index(&["Size"], true).unwrap(), index);

    let model = builder.build().unwrap();
    let pickle = model.entity_type(entity(&model, "Pickle"));

    assert_eq!(pickle.keys().count(), 2);
    assert_eq!(names(&model, pickle.key(alternate).properties()), ["Code"]);
    assert_ne!(pickle.primary_key().unwrap().id(), alternate);

    let index = pickle.index(index);
    assert!(index.is_unique());
    assert_eq!(names(&model, index.properties()), ["Size"]);
}

fn ignored_property() {
    let mut builder = models!(pickle().scalar("Size", Type::I16));

    builder.entity("Pickle").unwrap().ignore("Size").unwrap();

    let pickle = builder.model().entity_type(entity(builder.model(), "Pickle"));
    assert!(pickle.property_by_name("Size").is_none());
    assert!(pickle.is_ignored("Size"));

    // Declaring it again takes it back
    builder
        .entity("Pickle")
        .unwrap()
        .property("Size", Type::I16)
        .unwrap();

    let pickle = builder.model().entity_type(entity(builder.model(), "Pickle"));
    assert!(pickle.property_by_name("Size").is_some());
    assert!(!pickle.is_ignored("Size"));
}

fn ignored_navigation() {
    let mut builder = models!(big_mak(), pickle());

    builder.entity("Pickle").unwrap().ignore("BigMak").unwrap();

    let model = builder.build().unwrap();
    let pickle = model.entity_type(entity(&model, "Pickle"));
    let fk = model.foreign_keys().next().unwrap();

    assert!(pickle.navigation_by_name("BigMak").is_none());
    assert_eq!(fk.dependent_to_principal(), None);
    assert!(fk.principal_to_dependent().is_some());
}

fn remove_entity() {
    let mut builder = models!(big_mak(), pickle());

    builder.remove_entity("BigMak").unwrap();

    let model = builder.model();
    let pickle = model.entity_type(entity(model, "Pickle"));

    assert!(model.find_entity_type("BigMak").is_none());
    assert_eq!(model.foreign_keys().count(), 0);
    assert_eq!(pickle.navigations().count(), 0);
    assert!(pickle.property_by_name("BigMakId").is_none());

    let err = builder.remove_entity("BigMak").unwrap_err();
    assert!(err.is_invalid_argument());
}

fn entity_declared_by_hand() {
    let mut builder = ModelBuilder::new();

    let mut bun = builder.entity("Bun").unwrap();
    bun.property("Id", Type::I64).unwrap();
    bun.property("Seeds", Type::I32.nullable()).unwrap();
    bun.annotation("table", "buns").unwrap();

    let model = builder.build().unwrap();
    let bun = model.entity_type(entity(&model, "Bun"));

    assert_eq!(bun.source(), Provenance::Explicit);
    assert_eq!(names(&model, bun.primary_key().unwrap().properties()), ["Id"]);
    assert_eq!(bun.primary_key_source(), Some(Provenance::Convention));
    assert_eq!(bun.annotations().get("table").map(String::as_str), Some("buns"));
}

fn build_requires_primary_keys() {
    let mut builder = ModelBuilder::new();
    builder
        .entity("Bun")
        .unwrap()
        .property("Seeds", Type::I32)
        .unwrap();

    let err = builder.build().unwrap_err();
    assert!(err.is_invalid_model());
    assert_eq!(err.to_string(), "invalid model: `Bun` has no primary key");
}

tests!(
    property_configuration,
    non_nullable_property_cannot_become_nullable,
    conflicting_property_type_is_rejected,
    explicit_primary_key,
    primary_key_change_moves_relationships,
    unknown_key_property_is_rejected,
    alternate_keys_and_indexes,
    ignored_property,
    ignored_navigation,
    remove_entity,
    entity_declared_by_hand,
    build_requires_primary_keys,
);
