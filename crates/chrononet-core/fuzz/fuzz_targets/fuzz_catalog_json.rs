#![no_main]
use chrononet_core::data_loader::load_catalog_json_bytes;
use chrononet_core::validation::validate_catalog;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Parse, build and lint arbitrary bytes. Errors are fine, panics are not.
    if let Ok(builder) = load_catalog_json_bytes(data)
        && let Ok(catalog) = builder.build()
    {
        let _ = validate_catalog(&catalog);
    }
});
