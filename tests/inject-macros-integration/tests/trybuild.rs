//! trybuild compile-time tests for inject_macros

#[test]
fn trybuild_inject_macros() {
    let t = trybuild::TestCases::new();
    t.pass("tests/trybuild/injectable_ok.rs");
    t.pass("tests/trybuild/injection_target_ok.rs");
}
