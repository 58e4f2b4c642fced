//! Loading and saving a document against metadata.
//!
//! Run with: cargo run --example typed

use sdata::{
    from_str, to_string, AtomKind, ClassMetadata, DiagnosticCode, EnumMetadata, Error, FullName, LocalType,
    Metadata, TextSpan, Value,
};

const ORDER: &str = r#"<s = @"urn:shop">
(s::Order) {
    id = 1042,
    placed = "2024-05-01T09:30:00+02:00",
    status = s::Status.Shipped,
    lines = [
        { sku = "A-1", quantity = 2, price = 9.95 },
        { sku = "B-7", quantity = 1, price = 120.00 },
    ],
}"#;

fn metadata() -> Result<Metadata, Error> {
    let shop = |name: &str| FullName::new("urn:shop", name);
    Metadata::builder()
        .enum_type(
            EnumMetadata::new(shop("Status"), AtomKind::Int32)
                .member("Pending", 0)
                .member("Shipped", 1),
        )
        .class(
            ClassMetadata::new(shop("Line"))
                .property("sku", LocalType::Atom(AtomKind::String))
                .property("quantity", LocalType::Atom(AtomKind::Int32))
                .property("price", LocalType::Atom(AtomKind::Decimal))
                .on_loaded(|line, ctx| {
                    let quantity = line.get("quantity").and_then(Value::as_i64).unwrap_or(0);
                    if quantity <= 0 {
                        ctx.add_error(
                            DiagnosticCode::InvalidAtomValue,
                            "Quantity must be positive.",
                            TextSpan::default(),
                        );
                    }
                    quantity > 0
                }),
        )
        .class(
            ClassMetadata::new(shop("Order"))
                .property("id", LocalType::Atom(AtomKind::Int64))
                .property("placed", LocalType::Atom(AtomKind::DateTimeOffset))
                .property("status", LocalType::Enum(shop("Status")))
                .property("lines", LocalType::list(LocalType::Class(shop("Line"))))
                .property("note", LocalType::nullable(LocalType::Atom(AtomKind::String))),
        )
        .build()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let metadata = metadata()?;
    let order_class = FullName::new("urn:shop", "Order");

    let order = from_str(ORDER, &metadata, &order_class)?;
    println!("Loaded order {}", order.get("id").map(ToString::to_string).unwrap_or_default());
    println!("Saved back:\n{}\n", to_string(&order, &metadata)?);

    // Problems come back as a list of diagnostics
    let broken = ORDER
        .replace("quantity = 1,", "quantity = 0,")
        .replace("id = 1042,", "id = 1042, id = 1043,");
    match from_str(&broken, &metadata, &order_class) {
        Err(Error::Load(diagnostics)) => {
            for diagnostic in diagnostics {
                println!("{}", diagnostic);
            }
        }
        other => println!("unexpected: {:?}", other),
    }

    let missing = "<s = @\"urn:shop\"> { id = 1 }";
    if let Err(err) = from_str(missing, &metadata, &order_class) {
        println!("\n{}", err);
    }

    Ok(())
}
