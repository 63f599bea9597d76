use std::collections::HashSet;
use std::path::Path;

const CATALOG_PATH: &str = "categories/default_categories.json";
const MAX_AGE: u64 = 150;

fn main() {
    let catalog_path = Path::new(CATALOG_PATH);
    validate_catalog_file(catalog_path);
    set_build_dependencies();
}

fn validate_catalog_file(catalog_path: &Path) {
    assert!(
        catalog_path.exists(),
        "\n\nCATEGORY CATALOG BUILD ERROR: File not found\n\
         Path: {}\n\
         Please create the category catalog before building.\n",
        catalog_path.display()
    );

    let contents = std::fs::read_to_string(catalog_path).unwrap_or_else(|e| {
        panic!(
            "\n\nCATEGORY CATALOG BUILD ERROR: Failed to read file\n\
             Path: {}\n\
             Error: {e}\n",
            catalog_path.display()
        );
    });

    let catalog: serde_json::Value = serde_json::from_str(&contents).unwrap_or_else(|e| {
        panic!(
            "\n\nCATEGORY CATALOG BUILD ERROR: Invalid JSON\n\
             Path: {}\n\
             Error: {e}\n\
             Hint: Check for missing commas, brackets, or invalid syntax.\n",
            catalog_path.display()
        );
    });

    validate_catalog_structure(&catalog);
}

fn validate_catalog_structure(catalog: &serde_json::Value) {
    assert!(
        catalog.is_object(),
        "\n\nCATEGORY CATALOG BUILD ERROR: Root must be a JSON object\n\
         Got: {catalog}\n"
    );

    let entry_categories = required_array(catalog, "entry_categories");
    let prize_categories = required_array(catalog, "prize_categories");

    validate_categories(entry_categories, "entry", false);
    validate_categories(prize_categories, "prize", true);

    println!(
        "cargo:warning=Validated category catalog: {} entry categories, {} prize categories",
        entry_categories.len(),
        prize_categories.len()
    );
}

fn required_array<'a>(catalog: &'a serde_json::Value, field: &str) -> &'a [serde_json::Value] {
    let value = catalog.get(field).unwrap_or_else(|| {
        panic!(
            "\n\nCATEGORY CATALOG BUILD ERROR: Missing '{field}' field\n\
             The catalog must have a top-level '{field}' array.\n"
        );
    });

    value.as_array().map(Vec::as_slice).unwrap_or_else(|| {
        panic!(
            "\n\nCATEGORY CATALOG BUILD ERROR: '{field}' must be an array\n\
             Got: {value}\n"
        );
    })
}

fn validate_categories(categories: &[serde_json::Value], kind: &str, is_prize: bool) {
    let mut names = HashSet::new();

    for (i, category) in categories.iter().enumerate() {
        let name = category
            .get("short_name")
            .and_then(|v| v.as_str())
            .unwrap_or_else(|| {
                panic!(
                    "\n\nCATEGORY CATALOG BUILD ERROR: {kind} category at index {i} missing 'short_name' field\n"
                );
            });

        assert!(
            names.insert(name),
            "\n\nCATEGORY CATALOG BUILD ERROR: Duplicate {kind} category '{name}'\n"
        );

        let gender = category.get("gender").and_then(|v| v.as_str());
        assert!(
            matches!(gender, Some("Open" | "Women" | "Men" | "Mixed")),
            "\n\nCATEGORY CATALOG BUILD ERROR: {kind} category '{name}' has invalid gender {gender:?}\n\
             Expected one of Open, Women, Men, Mixed.\n"
        );

        validate_age_band(category, kind, name);

        if is_prize {
            let prizes = category
                .get("number_of_prizes")
                .and_then(serde_json::Value::as_u64);
            assert!(
                prizes.is_some_and(|n| n > 0),
                "\n\nCATEGORY CATALOG BUILD ERROR: prize category '{name}' must award at least one prize\n"
            );
        }
    }
}

fn validate_age_band(category: &serde_json::Value, kind: &str, name: &str) {
    let min = category
        .get("minimum_age")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(0);
    let max = category
        .get("maximum_age")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(MAX_AGE);

    assert!(
        min <= max,
        "\n\nCATEGORY CATALOG BUILD ERROR: {kind} category '{name}' has minimum age {min} above maximum age {max}\n"
    );
    assert!(
        max <= MAX_AGE,
        "\n\nCATEGORY CATALOG BUILD ERROR: {kind} category '{name}' has maximum age {max} above {MAX_AGE}\n"
    );
}

fn set_build_dependencies() {
    println!("cargo:rerun-if-changed={CATALOG_PATH}");
    println!("cargo:rerun-if-changed=build.rs");
}
