//! Credential definitions consumed by the workflow host.
//!
//! These are declarative records handed to the host's credential store;
//! they carry no behavior. The CAPTCHA-solving service itself is an
//! external collaborator reached with the stored API key.

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;

// ============================================================================
// CredentialType
// ============================================================================

/// A credential definition registered with the workflow host.
///
/// Serializes to the host's camelCase JSON schema.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialType {
    /// Machine name the host keys the credential by.
    pub name: String,

    /// Name shown in the host's UI.
    pub display_name: String,

    /// Link to service documentation; empty when none exists.
    pub documentation_url: String,

    /// Fields the user fills in.
    pub properties: Vec<CredentialProperty>,
}

// ============================================================================
// CredentialProperty
// ============================================================================

/// One field of a credential definition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialProperty {
    /// Label shown in the host's UI.
    pub display_name: String,

    /// Machine name of the field.
    pub name: String,

    /// Value type; the host understands `string`, `number`, `boolean`.
    #[serde(rename = "type")]
    pub value_type: String,

    /// Display options for the value type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_options: Option<TypeOptions>,

    /// Default value.
    pub default: String,

    /// Whether the field must be filled in.
    pub required: bool,
}

/// Display options for a credential property.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeOptions {
    /// Mask the value in the UI.
    pub password: bool,
}

// ============================================================================
// Definitions
// ============================================================================

/// The TwoCaptcha API credential: one required, masked API key.
#[must_use]
pub fn two_captcha_api() -> CredentialType {
    CredentialType {
        name: "twoCaptchaApi".to_string(),
        display_name: "TwoCaptcha API".to_string(),
        documentation_url: String::new(),
        properties: vec![CredentialProperty {
            display_name: "2Captcha API Key".to_string(),
            name: "twoCaptchaApiKey".to_string(),
            value_type: "string".to_string(),
            type_options: Some(TypeOptions { password: true }),
            default: String::new(),
            required: true,
        }],
    }
}

// ============================================================================
// Tests
// ============================================================================
