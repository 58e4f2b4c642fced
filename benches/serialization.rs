use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sdata::{
    from_str, from_str_untyped, to_string, to_string_untyped, AtomKind, ClassMetadata, FullName, LocalType,
    Metadata, Object, Value,
};

fn shop(name: &str) -> FullName {
    FullName::new("urn:bench", name)
}

fn metadata() -> Metadata {
    Metadata::builder()
        .class(
            ClassMetadata::new(shop("Product"))
                .property("sku", LocalType::Atom(AtomKind::String))
                .property("name", LocalType::Atom(AtomKind::String))
                .property("price", LocalType::Atom(AtomKind::Decimal))
                .property("quantity", LocalType::Atom(AtomKind::Int32)),
        )
        .class(
            ClassMetadata::new(shop("Catalog"))
                .property("products", LocalType::list(LocalType::Class(shop("Product"))))
                .property(
                    "tags",
                    LocalType::simple_set(LocalType::Atom(AtomKind::String)),
                ),
        )
        .build()
        .unwrap()
}

fn catalog(size: i32) -> Value {
    let products: Vec<Value> = (0..size)
        .map(|i| {
            Value::from(
                Object::new(shop("Product"))
                    .with("sku", format!("SKU{}", i))
                    .with("name", format!("Product {}", i))
                    .with("price", sdata::Atom::Decimal(sdata::Decimal::new(999 + i64::from(i), 2)))
                    .with("quantity", i),
            )
        })
        .collect();
    let tags = ["new", "sale", "featured"]
        .iter()
        .map(|t| Value::from(*t))
        .collect();
    Value::from(
        Object::new(shop("Catalog"))
            .with("products", products)
            .with("tags", Value::Set(tags)),
    )
}

fn benchmark_save_simple(c: &mut Criterion) {
    let metadata = metadata();
    let value = catalog(1);

    c.bench_function("save_simple_document", |b| {
        b.iter(|| to_string(black_box(&value), &metadata))
    });
}

fn benchmark_load_simple(c: &mut Criterion) {
    let metadata = metadata();
    let text = to_string(&catalog(1), &metadata).unwrap();

    c.bench_function("load_simple_document", |b| {
        b.iter(|| from_str(black_box(&text), &metadata, &shop("Catalog")))
    });
}

fn benchmark_save_catalog(c: &mut Criterion) {
    let metadata = metadata();
    let mut group = c.benchmark_group("save_catalog");

    for size in [10, 50, 100, 500].iter() {
        let value = catalog(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| to_string(black_box(&value), &metadata))
        });
    }
    group.finish();
}

fn benchmark_load_catalog(c: &mut Criterion) {
    let metadata = metadata();
    let mut group = c.benchmark_group("load_catalog");

    for size in [10, 50, 100, 500].iter() {
        let text = to_string(&catalog(*size), &metadata).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| from_str(black_box(&text), &metadata, &shop("Catalog")))
        });
    }
    group.finish();
}

fn benchmark_typed_vs_untyped(c: &mut Criterion) {
    let metadata = metadata();
    let text = to_string(&catalog(100), &metadata).unwrap();
    let untyped = from_str_untyped(&text).unwrap();

    let mut group = c.benchmark_group("typed_vs_untyped");
    group.bench_function("load_typed", |b| {
        b.iter(|| from_str(black_box(&text), &metadata, &shop("Catalog")))
    });
    group.bench_function("load_untyped", |b| {
        b.iter(|| from_str_untyped(black_box(&text)))
    });
    group.bench_function("save_untyped", |b| {
        b.iter(|| to_string_untyped(black_box(&untyped)))
    });
    group.finish();
}

fn benchmark_roundtrip(c: &mut Criterion) {
    let metadata = metadata();
    let value = catalog(50);

    c.bench_function("roundtrip_catalog", |b| {
        b.iter(|| {
            let text = to_string(black_box(&value), &metadata).unwrap();
            from_str(&text, &metadata, &shop("Catalog")).unwrap()
        })
    });
}

criterion_group!(
    benches,
    benchmark_save_simple,
    benchmark_load_simple,
    benchmark_save_catalog,
    benchmark_load_catalog,
    benchmark_typed_vs_untyped,
    benchmark_roundtrip
);
criterion_main!(benches);
