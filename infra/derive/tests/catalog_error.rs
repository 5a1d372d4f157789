use catalog_derive::catalog_error;
use std::borrow::Cow;

#[catalog_error]
pub enum SampleError {
    #[error("Sample I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Sample failure{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn missing_file() -> Result<Vec<u8>, SampleError> {
    std::fs::read("/definitely/not/here.json").context("Reading node file")
}

#[test]
fn catalog_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/catalog_error_pass.rs");
}

#[test]
fn source_errors_carry_context() {
    let err = missing_file().expect_err("file must be missing");
    assert!(matches!(err, SampleError::Io { context: Some(_), .. }));
    assert!(err.to_string().starts_with("Sample I/O error (Reading node file): "));
}

#[test]
fn strings_convert_into_internal_variant() {
    let err: SampleError = "broken invariant".into();
    assert_eq!(err.to_string(), "Sample failure: broken invariant");

    let with_context: Result<(), SampleError> = Err(SampleError::from(String::from("late")));
    let err = with_context.context("while writing").expect_err("still an error");
    assert_eq!(err.to_string(), "Sample failure (while writing): late");
}
