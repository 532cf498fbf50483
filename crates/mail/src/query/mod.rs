//! Remote search query construction
//!
//! Resolves user-supplied date expressions and turns them into the
//! `after:`/`before:` fragments of the Gmail search sublanguage.

mod dates;

pub use dates::{DateArgError, date_query, parse_date_arg};
