pub mod assertion;
pub mod claims;
pub mod signing;

pub use assertion::{AssertionHeader, SigningInput};
pub use claims::{AppClaims, IssuanceWindow};
pub use signing::AssertionSigner;
