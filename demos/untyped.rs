//! Reading and building documents without metadata.
//!
//! Run with: cargo run --example untyped

use sdata::{from_str_untyped, to_string_untyped, to_string_untyped_with_options, SaveOptions, UntypedObject, Value};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let text = r#"
        // application settings
        <cfg = @"urn:settings">
        (cfg::App) {
            name = "inventory",
            port = 8080,
            ratio = 0.75,
            hosts = [@"alpha", @"beta"],
            limits = #["read" = 100, "write" = 10],
            mode = cfg::Mode.Strict,
        }
    "#;

    let value = from_str_untyped(text)?;
    println!("name = {}", value.get("name").and_then(Value::as_str).unwrap_or("?"));
    println!("port = {}", value.get("port").and_then(Value::as_i64).unwrap_or(0));
    println!("hosts: {} items", value.get("hosts").and_then(Value::len).unwrap_or(0));

    println!("\nPretty:\n{}", to_string_untyped(&value)?);
    println!(
        "\nCompact:\n{}",
        to_string_untyped_with_options(&value, SaveOptions::compact())?
    );

    // Build a graph by hand
    let built = Value::from(
        UntypedObject::new()
            .with("title", "Notes\nsecond line")
            .with("done", false)
            .with("counts", vec![Value::from(1), Value::from(2), Value::Null]),
    );
    println!("\nBuilt:\n{}", to_string_untyped(&built)?);

    Ok(())
}
