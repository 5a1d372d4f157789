use catalog_derive::catalog_error;
use std::borrow::Cow;

#[catalog_error]
pub enum NodeError {
    #[error("Node I/O error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Node encoding error{}: {source}", format_context(.context))]
    Encode { source: std::fmt::Error, context: Option<Cow<'static, str>> },

    #[error("Internal node error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let err = NodeError::from(std::fmt::Error);
    let _ = err.to_string();
}
