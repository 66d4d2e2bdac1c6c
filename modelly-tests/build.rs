fn main() {
    // Generate the demo schema into OUT_DIR; the integration tests read the files back
    modelly_codegen::generate_from_cargo_metadata().expect("codegen failed");
}
