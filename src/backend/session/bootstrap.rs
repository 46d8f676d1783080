//! License payload sent on a session's first contact.

use crate::shared::{CapabilityPayload, INITIAL_RESPONSE};

static INITIAL_PAYLOAD: CapabilityPayload = INITIAL_RESPONSE;

/// The capability payload every new session receives first
///
/// Independent of document, format or caller.
pub fn initial_session_payload() -> &'static CapabilityPayload {
    &INITIAL_PAYLOAD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_is_constant() {
        assert_eq!(*initial_session_payload(), INITIAL_RESPONSE);
        assert!(std::ptr::eq(initial_session_payload(), initial_session_payload()));
        assert_eq!(initial_session_payload().kind, "license");
    }
}
