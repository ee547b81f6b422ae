//! Literal parameter types for shared scenarios.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Raised when a parameter string names no known variant.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownParameter {
    /// Parameter kind (for example `hypervisor`).
    pub kind: &'static str,
    /// Rejected value.
    pub value: String,
}

macro_rules! parameter_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Lowercase wire string for the value.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownParameter;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(UnknownParameter {
                        kind: $kind,
                        value: value.to_owned(),
                    }),
                }
            }
        }
    };
}

parameter_enum! {
    /// Cloud or bare-metal provider a scenario provisions against.
    Provider, "provider" {
        /// Equinix Metal.
        Equinix => "equinix",
        /// Amazon Web Services.
        Aws => "aws",
        /// Hosts managed outside any provider API.
        Onprem => "onprem",
    }
}

parameter_enum! {
    /// Hypervisor installed on provisioned hosts.
    Hypervisor, "hypervisor" {
        /// KVM.
        Kvm => "kvm",
        /// QEMU without KVM acceleration.
        Qemu => "qemu",
        /// LXC containers.
        Lxc => "lxc",
        /// Firecracker micro-VMs.
        Firecracker => "firecracker",
    }
}

parameter_enum! {
    /// Kind of host the provider allocates.
    ResourceType, "resource type" {
        /// Dedicated bare-metal host.
        Metal => "metal",
        /// Virtual machine.
        Virtual => "virtual",
    }
}

/// Literal parameters bound to one instance of a shared scenario.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct ScenarioParameters {
    /// Provider the scenario targets.
    pub provider: Provider,
    /// Hypervisor to deploy.
    pub hypervisor: Hypervisor,
    /// Kind of host to allocate.
    pub resource_type: ResourceType,
    /// Provider-specific instance size (for example `c3.medium`).
    pub instance_type: String,
}

impl ScenarioParameters {
    /// Bundles the literal parameters.
    #[must_use]
    pub fn new(
        provider: Provider,
        hypervisor: Hypervisor,
        resource_type: ResourceType,
        instance_type: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            hypervisor,
            resource_type,
            instance_type: instance_type.into(),
        }
    }
}

impl fmt::Display for ScenarioParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.hypervisor, self.resource_type, self.instance_type
        )
    }
}
