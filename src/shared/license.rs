/**
 * License Payload
 *
 * The first message a new editing session receives describes what the
 * editor is licensed to do. The record never changes while the process
 * runs, so it is a `const` rather than something assembled per request.
 */
use serde::Serialize;

/// Editor build version reported to clients
pub const BUILD_VERSION: &str = "5.3.2";

/// Editor build number reported to clients
pub const BUILD_NUMBER: u32 = 20;

/// License type reported to clients
pub const LICENSE_TYPE: u8 = 3;

/// Editor licensing and feature flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    #[serde(rename = "type")]
    pub license_type: u8,
    pub light: bool,
    pub mode: u8,
    pub rights: u8,
    pub build_version: &'static str,
    pub build_number: u32,
    pub branding: bool,
    pub customization: bool,
    pub plugins: bool,
}

/// The `license` envelope sent at session bootstrap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapabilityPayload {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub license: License,
}

/// Capability payload returned to every new session
pub const INITIAL_RESPONSE: CapabilityPayload = CapabilityPayload {
    kind: "license",
    license: License {
        license_type: LICENSE_TYPE,
        light: false,
        mode: 0,
        rights: 1,
        build_version: BUILD_VERSION,
        build_number: BUILD_NUMBER,
        branding: false,
        customization: false,
        plugins: false,
    },
};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_initial_response_shape() {
        let value = serde_json::to_value(INITIAL_RESPONSE).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "license",
                "license": {
                    "type": 3,
                    "light": false,
                    "mode": 0,
                    "rights": 1,
                    "buildVersion": "5.3.2",
                    "buildNumber": 20,
                    "branding": false,
                    "customization": false,
                    "plugins": false
                }
            })
        );
    }

    #[test]
    fn test_serialization_is_stable() {
        let first = serde_json::to_vec(&INITIAL_RESPONSE).unwrap();
        let second = serde_json::to_vec(&INITIAL_RESPONSE).unwrap();
        assert_eq!(first, second);
    }
}
