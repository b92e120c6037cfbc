//! Configuration for blvm-taproot
//!
//! Provides the resource limits and policy switches used by witness assembly
//! and spend verification. Settings can be loaded from JSON, from environment
//! variables, or built programmatically. Nothing here changes what a valid
//! commitment is; the limits only bound the work a verifier is willing to do.

use crate::constants::{
    MAX_SCRIPT_ELEMENT_SIZE, MAX_STACK_SIZE, TAPROOT_CONTROL_MAX_NODE_COUNT,
    TAPROOT_LEAF_TAPSCRIPT,
};
use crate::error::{Result, TaprootError};
use serde::{Deserialize, Serialize};

/// Resource limits applied while assembling and verifying spends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum Merkle proof depth accepted from a control block (BIP 341: 128)
    #[serde(default = "default_max_merkle_depth")]
    pub max_merkle_depth: usize,

    /// Maximum size of a single script input (tapscript element limit: 520 bytes)
    #[serde(default = "default_max_script_input_size")]
    pub max_script_input_size: usize,

    /// Maximum number of witness stack items
    #[serde(default = "default_max_witness_items")]
    pub max_witness_items: usize,
}

fn default_max_merkle_depth() -> usize {
    TAPROOT_CONTROL_MAX_NODE_COUNT
}

fn default_max_script_input_size() -> usize {
    MAX_SCRIPT_ELEMENT_SIZE
}

fn default_max_witness_items() -> usize {
    MAX_STACK_SIZE
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_merkle_depth: default_max_merkle_depth(),
            max_script_input_size: default_max_script_input_size(),
            max_witness_items: default_max_witness_items(),
        }
    }
}

/// Witness assembly policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessConfig {
    /// Accept 65-byte key-path signatures carrying an explicit sighash type byte
    /// Default: true
    #[serde(default = "default_true")]
    pub allow_sighash_suffix: bool,

    /// Leaf version used for predicates compiled into new leaves
    /// Default: 0xc0 (BIP 342 tapscript)
    #[serde(default = "default_leaf_version")]
    pub default_leaf_version: u8,
}

fn default_true() -> bool {
    true
}

fn default_leaf_version() -> u8 {
    TAPROOT_LEAF_TAPSCRIPT
}

impl Default for WitnessConfig {
    fn default() -> Self {
        Self {
            allow_sighash_suffix: true,
            default_leaf_version: TAPROOT_LEAF_TAPSCRIPT,
        }
    }
}

/// Debug settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Log the reason for every rejected spend at debug level
    #[serde(default)]
    pub log_rejections: bool,
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaprootConfig {
    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub witness: WitnessConfig,

    #[serde(default)]
    pub debug: DebugConfig,
}

impl TaprootConfig {
    /// Load configuration from environment variables
    ///
    /// Variables follow `BLVM_TAPROOT_<SECTION>_<KEY>`; values that fail to
    /// parse are ignored and the default is kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("BLVM_TAPROOT_LIMITS_MAX_MERKLE_DEPTH") {
            if let Ok(depth) = val.parse::<usize>() {
                config.limits.max_merkle_depth = depth;
            }
        }
        if let Ok(val) = std::env::var("BLVM_TAPROOT_LIMITS_MAX_SCRIPT_INPUT_SIZE") {
            if let Ok(size) = val.parse::<usize>() {
                config.limits.max_script_input_size = size;
            }
        }
        if let Ok(val) = std::env::var("BLVM_TAPROOT_LIMITS_MAX_WITNESS_ITEMS") {
            if let Ok(count) = val.parse::<usize>() {
                config.limits.max_witness_items = count;
            }
        }

        if let Ok(val) = std::env::var("BLVM_TAPROOT_WITNESS_ALLOW_SIGHASH_SUFFIX") {
            if let Ok(enabled) = val.parse::<bool>() {
                config.witness.allow_sighash_suffix = enabled;
            }
        }
        if let Ok(val) = std::env::var("BLVM_TAPROOT_WITNESS_DEFAULT_LEAF_VERSION") {
            if let Some(version) = parse_u8(&val) {
                config.witness.default_leaf_version = version;
            }
        }

        if let Ok(val) = std::env::var("BLVM_TAPROOT_DEBUG_LOG_REJECTIONS") {
            if let Ok(enabled) = val.parse::<bool>() {
                config.debug.log_rejections = enabled;
            }
        }

        config
    }

    /// Parse configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TaprootError::Config(e.to_string().into()))
    }

    /// Serialize configuration to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| TaprootError::Config(e.to_string().into()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.limits.max_merkle_depth > TAPROOT_CONTROL_MAX_NODE_COUNT {
            return Err(TaprootError::Config(
                format!(
                    "max_merkle_depth {} exceeds {}",
                    self.limits.max_merkle_depth, TAPROOT_CONTROL_MAX_NODE_COUNT
                )
                .into(),
            ));
        }
        if self.limits.max_script_input_size == 0 {
            return Err(TaprootError::Config("max_script_input_size must be non-zero".into()));
        }
        if self.limits.max_witness_items < 2 {
            return Err(TaprootError::Config(
                "max_witness_items must allow a script and control block".into(),
            ));
        }
        if self.witness.default_leaf_version & 1 != 0 {
            return Err(TaprootError::Config(
                format!(
                    "default_leaf_version {:#04x} is odd",
                    self.witness.default_leaf_version
                )
                .into(),
            ));
        }
        Ok(())
    }
}

/// Accept decimal or `0x`-prefixed hex
fn parse_u8(val: &str) -> Option<u8> {
    match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => val.parse::<u8>().ok(),
    }
}
