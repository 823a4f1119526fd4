pub mod claims;
pub mod codec;
pub mod errors;
pub mod model;

pub use claims::Claims;
pub use claims::CLAIM_KEYS;
pub use codec::TokenCodec;
pub use errors::TokenError;
pub use model::Token;
