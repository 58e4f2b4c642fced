use sdata::{
    from_str, from_str_untyped, to_string, to_string_with_options, to_writer, Atom, AtomKind, ClassMetadata,
    DiagnosticCode, EnumMetadata, Error, FullName, LocalType, Metadata, Object, SaveOptions, TextSpan,
    Value,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const SHOP: &str = "urn:shop";

fn shop(name: &str) -> FullName {
    FullName::new(SHOP, name)
}

fn string() -> LocalType {
    LocalType::Atom(AtomKind::String)
}

fn int32() -> LocalType {
    LocalType::Atom(AtomKind::Int32)
}

fn shop_metadata() -> Metadata {
    Metadata::builder()
        .enum_type(
            EnumMetadata::new(shop("Status"), AtomKind::Int32)
                .member("Pending", 0)
                .member("Shipped", 1),
        )
        .enum_type(EnumMetadata::new(shop("Color"), AtomKind::Int32).member("Red", 0))
        .class(
            ClassMetadata::new(shop("Entity"))
                .abstract_class()
                .property("id", LocalType::Atom(AtomKind::Int64)),
        )
        .class(
            ClassMetadata::new(shop("Customer"))
                .base(shop("Entity"))
                .property("name", string())
                .property("email", LocalType::nullable(string())),
        )
        .class(
            ClassMetadata::new(shop("VipCustomer"))
                .base(shop("Customer"))
                .property("level", int32()),
        )
        .class(
            ClassMetadata::new(shop("Line"))
                .property("sku", string())
                .property("quantity", int32()),
        )
        .class(
            ClassMetadata::new(shop("Order"))
                .unknown_properties()
                .property("id", LocalType::Atom(AtomKind::Int64))
                .property("customer", LocalType::Class(shop("Customer")))
                .property("status", LocalType::Enum(shop("Status")))
                .property("lines", LocalType::list(LocalType::Class(shop("Line"))))
                .property("tags", LocalType::simple_set(string()))
                .property(
                    "prices",
                    LocalType::map(string(), LocalType::Atom(AtomKind::Decimal)),
                )
                .property("products", LocalType::object_set(shop("Line"), ["sku"]))
                .property("note", LocalType::nullable(string())),
        )
        .build()
        .unwrap()
}

const ORDER: &str = r#"<s = @"urn:shop">
(s::Order) {
    id = 1042,
    customer = (s::VipCustomer) { id = 7, name = "Ann", level = 3 },
    status = s::Status.Shipped,
    lines = [
        { sku = "A-1", quantity = 2 },
        { sku = "B-7", quantity = 1 },
    ],
    tags = ["rush", "gift"],
    prices = #["A-1" = 9.95, "B-7" = 120.00],
    products = [{ sku = "A-1", quantity = 5 }],
}"#;

fn load_codes(text: &str, metadata: &Metadata, class: &FullName) -> Vec<DiagnosticCode> {
    match from_str(text, metadata, class) {
        Err(Error::Load(diagnostics)) => diagnostics.iter().map(|d| d.code).collect(),
        other => panic!("expected load error, got {:?}", other),
    }
}

fn first_code(text: &str, metadata: &Metadata, class: &FullName) -> DiagnosticCode {
    load_codes(text, metadata, class)[0]
}

#[test]
fn test_typed_order() {
    let metadata = shop_metadata();
    let order = from_str(ORDER, &metadata, &shop("Order")).unwrap();

    assert_eq!(order.get("id").and_then(Value::as_i64), Some(1042));
    let customer = order.get("customer").and_then(Value::as_object).unwrap();
    assert_eq!(customer.class(), &shop("VipCustomer"));
    assert!(customer.get("email").unwrap().is_null());

    let status = order.get("status").and_then(Value::as_enum).unwrap();
    assert_eq!(status.member, "Shipped");
    assert_eq!(order.get("lines").and_then(Value::len), Some(2));
    assert_eq!(order.get("tags").and_then(Value::len), Some(2));
    assert_eq!(order.get("prices").and_then(Value::len), Some(2));
    assert!(order.get("note").unwrap().is_null());

    let products = order.get("products").and_then(Value::as_object_set).unwrap();
    let line = products.get(&Value::from("A-1")).unwrap();
    assert_eq!(line.get("quantity").and_then(Value::as_i64), Some(5));
}

#[test]
fn test_save_load_inverse() {
    let metadata = shop_metadata();
    let order = from_str(ORDER, &metadata, &shop("Order")).unwrap();

    let text = to_string(&order, &metadata).unwrap();
    println!("Saved order:\n{}", text);
    assert!(text.starts_with("<a0 = @\"urn:shop\">\n(a0::Order) {\n"));
    assert!(text.contains("customer = (a0::VipCustomer) {"));
    assert!(text.contains("status = a0::Status.Shipped"));
    assert!(text.contains("note = null"));

    let reloaded = from_str(&text, &metadata, &shop("Order")).unwrap();
    assert_eq!(reloaded, order);
    assert_eq!(to_string(&reloaded, &metadata).unwrap(), text);

    let compact = to_string_with_options(&order, &metadata, SaveOptions::compact()).unwrap();
    assert!(!compact.contains('\n'));
    assert_eq!(from_str(&compact, &metadata, &shop("Order")).unwrap(), order);
}

#[test]
fn test_saved_typed_document_loads_untyped() {
    let metadata = shop_metadata();
    let order = from_str(ORDER, &metadata, &shop("Order")).unwrap();
    let text = to_string(&order, &metadata).unwrap();

    let untyped = from_str_untyped(&text).unwrap();
    let root = untyped.as_untyped_object().unwrap();
    assert_eq!(root.type_indicator, Some(shop("Order")));
    assert_eq!(untyped.get("id").and_then(Value::as_i64), Some(1042));
}

#[test]
fn test_duplicate_property_position() {
    let metadata = shop_metadata();
    let err = from_str(
        "{ sku = \"a\",\n  sku = \"b\", quantity = 1 }",
        &metadata,
        &shop("Line"),
    )
    .unwrap_err();
    let diagnostics = err.diagnostics().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, DiagnosticCode::DuplicatePropertyName);
    assert_eq!(diagnostics[0].span.start.line, 2);
    assert_eq!(diagnostics[0].span.start.column, 3);
}

#[test]
fn test_every_missing_property_reported() {
    let point = FullName::new("urn:geo", "Point");
    let metadata = Metadata::builder()
        .class(
            ClassMetadata::new(point.clone())
                .property("x", int32())
                .property("y", int32())
                .property("z", int32()),
        )
        .build()
        .unwrap();

    let err = from_str("{ x = 1 }", &metadata, &point).unwrap_err();
    let diagnostics = err.diagnostics().unwrap();
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics.iter().all(|d| d.code == DiagnosticCode::PropertyMissing));
    assert!(diagnostics[0].message.contains("'y'"));
    assert!(diagnostics[1].message.contains("'z'"));
    // both point at the closing brace
    assert_eq!(diagnostics[0].span.start.column, 9);
    assert_eq!(diagnostics[0].span, diagnostics[1].span);
}

fn bag() -> (Metadata, FullName) {
    let name = FullName::new("urn:bag", "Bag");
    let metadata = Metadata::builder()
        .class(
            ClassMetadata::new(name.clone())
                .property("tags", LocalType::nullable(LocalType::simple_set(int32())))
                .property("counts", LocalType::nullable(LocalType::map(int32(), int32()))),
        )
        .build()
        .unwrap();
    (metadata, name)
}

#[test]
fn test_duplicate_set_item_position() {
    let (metadata, name) = bag();
    let err = from_str("{ tags = [1, 2, 1] }", &metadata, &name).unwrap_err();
    let diagnostics = err.diagnostics().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, DiagnosticCode::DuplicateSetItem);
    assert_eq!(diagnostics[0].span.start.line, 1);
    assert_eq!(diagnostics[0].span.start.column, 17);
}

#[test]
fn test_duplicate_map_key_position() {
    let (metadata, name) = bag();
    let err = from_str("{ counts = #[1 = 10, 1 = 20] }", &metadata, &name).unwrap_err();
    let diagnostics = err.diagnostics().unwrap();
    assert_eq!(diagnostics[0].code, DiagnosticCode::DuplicateMapKey);
    assert_eq!(diagnostics[0].span.start.column, 22);
}

#[test]
fn test_sets_compare_without_order() {
    let (metadata, name) = bag();
    let a = from_str("{ tags = [1, 2, 3], counts = #[1 = 1, 2 = 2] }", &metadata, &name).unwrap();
    let b = from_str("{ counts = #[2 = 2, 1 = 1], tags = [3, 2, 1] }", &metadata, &name).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_alias_shadowing() {
    let outer = FullName::new("urn:one", "Outer");
    let inner = FullName::new("urn:two", "Inner");
    let kind = FullName::new("urn:one", "Kind");
    let metadata = Metadata::builder()
        .enum_type(EnumMetadata::new(kind.clone(), AtomKind::Int32).member("X", 0))
        .class(ClassMetadata::new(inner.clone()))
        .class(
            ClassMetadata::new(outer.clone())
                .property("inner", LocalType::Class(inner.clone()))
                .property("kind", LocalType::Enum(kind.clone())),
        )
        .build()
        .unwrap();

    let text = r#"<a = @"urn:one"> {
        inner = <a = @"urn:two"> (a::Inner) { },
        kind = a::Kind.X
    }"#;
    let value = from_str(text, &metadata, &outer).unwrap();
    assert_eq!(value.get("inner").and_then(Value::as_object).map(Object::class), Some(&inner));
    assert_eq!(value.get("kind").and_then(Value::as_enum).map(|e| &e.enum_name), Some(&kind));

    // the inner binding is gone once its class value ends
    let text = r#"<a = @"urn:one"> {
        inner = <b = @"urn:two"> (b::Inner) { },
        kind = b::Kind.X
    }"#;
    assert_eq!(first_code(text, &metadata, &outer), DiagnosticCode::InvalidUriReference);
}

#[test]
fn test_nullable_properties() {
    let metadata = shop_metadata();
    let customer = from_str("{ id = 1, name = \"Bo\" }", &metadata, &shop("Customer")).unwrap();
    assert!(customer.get("email").unwrap().is_null());

    let customer = from_str("{ id = 1, name = \"Bo\", email = null }", &metadata, &shop("Customer")).unwrap();
    assert!(customer.get("email").unwrap().is_null());

    assert_eq!(
        first_code("{ id = 1, name = null }", &metadata, &shop("Customer")),
        DiagnosticCode::NullNotAllowed
    );
}

#[test]
fn test_type_mismatches() {
    let metadata = shop_metadata();
    let line = shop("Line");
    assert_eq!(first_code("{ sku = [1], quantity = 1 }", &metadata, &line), DiagnosticCode::SpecificValueExpected);
    assert_eq!(first_code("{ sku = \"a\", quantity = \"many\" }", &metadata, &line), DiagnosticCode::InvalidAtomValue);
    assert_eq!(first_code("{ sku = \"a\", quantity = 1, size = 2 }", &metadata, &line), DiagnosticCode::InvalidPropertyName);

    // typed atoms read any atom token
    let value = from_str("{ sku = 12, quantity = \"3\" }", &metadata, &line).unwrap();
    assert_eq!(value.get("sku").and_then(Value::as_str), Some("12"));
    assert_eq!(value.get("quantity").and_then(Value::as_i64), Some(3));
}

#[test]
fn test_enum_references() {
    let status = shop("Status");
    let holder = FullName::new("urn:t", "Holder");
    let metadata = Metadata::builder()
        .enum_type(
            EnumMetadata::new(status.clone(), AtomKind::Int32)
                .member("Pending", 0)
                .member("Shipped", 1),
        )
        .enum_type(EnumMetadata::new(shop("Color"), AtomKind::Int32).member("Red", 0))
        .class(ClassMetadata::new(holder.clone()).property("status", LocalType::Enum(status.clone())))
        .build()
        .unwrap();

    let value = from_str("{ status = 1 }", &metadata, &holder).unwrap();
    assert_eq!(value.get("status").and_then(Value::as_enum).map(|e| e.member.as_str()), Some("Shipped"));

    let prefix = "<s = @\"urn:shop\"> ";
    let load = |body: &str| first_code(&format!("{}{}", prefix, body), &metadata, &holder);
    assert_eq!(load("{ status = s::Status.Lost }"), DiagnosticCode::InvalidEnumMemberName);
    assert_eq!(load("{ status = s::Color.Red }"), DiagnosticCode::EnumNotEqualToTheDeclared);
    assert_eq!(load("{ status = s::Mood.Happy }"), DiagnosticCode::InvalidEnumReference);
    assert_eq!(load("{ status = 7 }"), DiagnosticCode::InvalidEnumMemberName);
}

#[test]
fn test_class_references() {
    let metadata = shop_metadata();
    let entity = shop("Entity");
    assert_eq!(first_code("{ id = 1 }", &metadata, &entity), DiagnosticCode::ClassIsAbstract);

    let prefix = "<s = @\"urn:shop\"> ";
    let load = |body: &str| from_str(&format!("{}{}", prefix, body), &metadata, &entity);
    let customer = load("(s::Customer) { id = 1, name = \"Ann\" }").unwrap();
    assert_eq!(customer.as_object().map(Object::class), Some(&shop("Customer")));

    let codes = |body: &str| match load(body) {
        Err(Error::Load(d)) => d[0].code,
        other => panic!("expected load error, got {:?}", other),
    };
    assert_eq!(codes("(s::Line) { sku = \"a\", quantity = 1 }"), DiagnosticCode::ClassNotEqualToOrDeriveFromTheDeclared);
    assert_eq!(codes("(s::Ghost) { }"), DiagnosticCode::InvalidClassReference);
    assert_eq!(codes("(s::Entity) { id = 1 }"), DiagnosticCode::ClassIsAbstract);
}

#[test]
fn test_inherited_properties() {
    let metadata = shop_metadata();
    let vip = from_str("{ level = 2, name = \"Cy\", id = 9 }", &metadata, &shop("VipCustomer")).unwrap();
    let text = to_string_with_options(&vip, &metadata, SaveOptions::compact()).unwrap();
    // base class properties come first
    assert_eq!(
        text,
        "<a0 = @\"urn:shop\"> (a0::VipCustomer) { id = 9, name = @\"Cy\", email = null, level = 2 }"
    );
}

#[test]
fn test_object_set_duplicate_key() {
    let metadata = shop_metadata();
    let text = ORDER.replace(
        "products = [{ sku = \"A-1\", quantity = 5 }]",
        "products = [{ sku = \"A-1\", quantity = 5 }, { sku = \"A-1\", quantity = 6 }]",
    );
    assert_eq!(first_code(&text, &metadata, &shop("Order")), DiagnosticCode::DuplicateSetItem);
}

#[test]
fn test_unknown_properties_collected() {
    let metadata = shop_metadata();
    let text = ORDER.replace("id = 1042,", "id = 1042,\n    extra = [1, 2],");
    let order = from_str(&text, &metadata, &shop("Order")).unwrap();
    let object = order.as_object().unwrap();
    assert!(object.properties.get("extra").is_none());
    assert_eq!(object.unknown_properties.get("extra").and_then(Value::len), Some(2));

    let saved = to_string(&order, &metadata).unwrap();
    assert!(saved.contains("extra = ["));
    assert_eq!(from_str(&saved, &metadata, &shop("Order")).unwrap(), order);
}

#[test]
fn test_hooks() {
    let loading = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&loading);
    let line = FullName::new("urn:h", "Line");
    let metadata = Metadata::builder()
        .class(
            ClassMetadata::new(line.clone())
                .property("sku", string())
                .property("quantity", int32())
                .on_loading(move |_, _| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    true
                })
                .on_loaded(|object, ctx| {
                    let positive = object
                        .get("quantity")
                        .and_then(Value::as_i64)
                        .is_some_and(|q| q > 0);
                    if !positive {
                        ctx.add_error(
                            DiagnosticCode::InvalidAtomValue,
                            "Quantity must be positive.",
                            TextSpan::default(),
                        );
                        return false;
                    }
                    if let Some(Value::Atom(Atom::String(sku))) = object.properties.get_mut("sku") {
                        *sku = sku.to_uppercase();
                    }
                    true
                }),
        )
        .build()
        .unwrap();

    let value = from_str("{ sku = \"a-1\", quantity = 2 }", &metadata, &line).unwrap();
    assert_eq!(value.get("sku").and_then(Value::as_str), Some("A-1"));
    assert_eq!(loading.load(Ordering::SeqCst), 1);

    let err = from_str("{ sku = \"a-1\", quantity = 0 }", &metadata, &line).unwrap_err();
    let diagnostics = err.diagnostics().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Quantity must be positive.");
}

#[test]
fn test_hook_failing_silently_is_internal_error() {
    let name = FullName::new("urn:h", "Silent");
    let metadata = Metadata::builder()
        .class(ClassMetadata::new(name.clone()).on_loaded(|_, _| false))
        .build()
        .unwrap();
    assert!(matches!(from_str("{ }", &metadata, &name), Err(Error::Internal(_))));
}

#[test]
fn test_saver_rejects_invalid_graphs() {
    let metadata = shop_metadata();

    let customer = Value::from(Object::new(shop("Customer")).with("id", 1_i64));
    assert!(matches!(to_string(&customer, &metadata), Err(Error::InvalidValue(_))));

    let entity = Value::from(Object::new(shop("Entity")).with("id", 1_i64));
    assert!(matches!(to_string(&entity, &metadata), Err(Error::InvalidValue(_))));

    let wrong_kind = Value::from(Object::new(shop("Line")).with("sku", "a").with("quantity", 1_i64));
    assert!(matches!(to_string(&wrong_kind, &metadata), Err(Error::InvalidValue(_))));

    let undeclared = Value::from(
        Object::new(shop("Line"))
            .with("sku", "a")
            .with("quantity", 1)
            .with("size", 2),
    );
    assert!(matches!(to_string(&undeclared, &metadata), Err(Error::InvalidValue(_))));
}

#[test]
fn test_to_writer() {
    let metadata = shop_metadata();
    let line = Value::from(Object::new(shop("Line")).with("sku", "a").with("quantity", 1));
    let mut out = Vec::new();
    to_writer(&mut out, &line, &metadata).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(from_str(&text, &metadata, &shop("Line")).unwrap(), line);
}

#[test]
fn test_diagnostics_serialize_to_json() {
    let err = from_str_untyped("{ a = 1,\n  a = 2 }").unwrap_err();
    let json = serde_json::to_value(err.diagnostics().unwrap()).unwrap();
    assert_eq!(json[0]["code"], "DuplicatePropertyName");
    assert_eq!(json[0]["severity"], "Error");
    assert_eq!(json[0]["span"]["start"]["line"], 2);
    assert_eq!(json[0]["span"]["start"]["column"], 3);
}
