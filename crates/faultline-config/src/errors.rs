use serde::Deserialize;

/// Boundary error policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorPolicyConfig {
    /// Include the diagnostic `detail` in error responses
    #[serde(default)]
    pub expose_detail: bool,
    /// Apply the gateway code table to outgoing display codes
    #[serde(default = "default_gateway_remap")]
    pub gateway_remap: bool,
}

impl Default for ErrorPolicyConfig {
    fn default() -> Self {
        Self {
            expose_detail: false,
            gateway_remap: true,
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_gateway_remap() -> bool {
    true
}
