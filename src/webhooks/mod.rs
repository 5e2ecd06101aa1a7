//! GitHub webhook intake: signature checks, event types and payload decoding.

pub mod events;
pub mod parser;
pub mod signature;

pub use events::{Event, StarAction};
pub use parser::{DecodeFn, ParseError, ParserRegistry};
pub use signature::{
    SignatureError, check_signature, compute_signature, format_signature_header,
    parse_signature_header, verify_signature,
};
