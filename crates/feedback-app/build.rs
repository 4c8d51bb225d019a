use std::path::PathBuf;

fn main() {
    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("manifest dir"));
    let version_path = manifest_dir
        .ancestors()
        .nth(2)
        .expect("workspace root above crates/feedback-app")
        .join("VERSION");

    println!("cargo:rerun-if-changed={}", version_path.display());

    let version = std::fs::read_to_string(&version_path).expect("read VERSION file");
    let version = version.trim();
    assert!(
        !version.is_empty() && version.split('.').all(|part| !part.is_empty()),
        "VERSION must hold a dotted version, got {version:?}"
    );

    println!("cargo:rustc-env=FEEDBACK_FORM_VERSION={version}");
}
