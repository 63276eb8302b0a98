//! Parameter policies and the component binding registry.
//!
//! Each mounted component declares a [`PolicySet`] describing the parameters
//! it synchronizes. The [`Registry`] is a side table mapping a
//! [`ComponentId`] to its [`ComponentBinding`]: the working state, the
//! policies, and the scope used for durable keys and diagnostics. Nothing is
//! ever attached to the component itself.
//!
//! Policies can be built in code or declared in TOML:
//!
//! ```toml
//! scope = "catalog"
//!
//! [params.page]
//! type = "number"
//! default = 1
//! url = true
//! history = true
//!
//! [params.theme]
//! type = "string"
//! durable = true
//! ```

pub mod binding;
pub mod declare;
pub mod error;
pub mod policy;
pub mod registry;

pub use binding::{BindingHandle, ComponentBinding, ComponentId, WorkingState};
pub use declare::{PolicyConfigError, PolicyDeclarations};
pub use error::RegistryError;
pub use policy::{ParamPolicy, PolicySet};
pub use registry::Registry;
pub use tether_primitives::{ParamType, ParamValue};
