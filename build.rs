fn main() {
    // CI sets WFW_BUILD_NUMBER; local builds fall back to the checked-in file.
    let build_number = std::env::var("WFW_BUILD_NUMBER")
        .ok()
        .or_else(|| std::fs::read_to_string("BUILD_NUMBER").ok())
        .map_or_else(|| "0".to_string(), |s| s.trim().to_string());

    println!("cargo:rustc-env=BUILD_NUMBER={build_number}");
    println!("cargo:rerun-if-changed=BUILD_NUMBER");
    println!("cargo:rerun-if-env-changed=WFW_BUILD_NUMBER");
}
